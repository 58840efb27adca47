//! Application wiring (§A.3): ties configuration, the selected backend's
//! `RepositoryFactory`, and an SMTP transport together, the same shape as
//! the teacher's `common::{ConfigProvider, MailTransporter, AppState}`.
//! Unlike the teacher, the backend is chosen at runtime from `AppConfig`
//! rather than fixed by a generic parameter — this crate supports three
//! interchangeable backends (C4/C5/C6) behind one `RepositoryFactory` trait
//! object, where the teacher only ever has Postgres.

pub mod config;
pub mod init;

use crate::app::config::{AppConfig, BackendKind};
use crate::backend::kv::KvRepositoryFactory;
use crate::backend::memory::MemoryRepositoryFactory;
use crate::backend::relational::{PgPoolManager, PgPoolManagerTrait, RelationalRepositoryFactory};
use crate::mail::{MailError, MailProvider, NormalizedMessage};
use crate::repository::RepositoryFactory;
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

pub trait ConfigProvider: Send + Sync {
    fn config(&self) -> Arc<AppConfig>;
}

pub type DefaultSmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

/// The composed application state. `T` is the SMTP transport type — kept
/// generic, as the teacher does, so tests can substitute a stub transport
/// without touching the rest of `AppState`.
pub struct AppState<T>
where
    T: Send + Sync,
{
    pub config: Arc<AppConfig>,
    pub default_smtp_transport: Arc<T>,
    pub repositories: Arc<dyn RepositoryFactory>,
}

pub type DefaultAppState = AppState<DefaultSmtpTransport>;

impl DefaultAppState {
    fn init_config() -> anyhow::Result<AppConfig> {
        Ok(AppConfig::from_env()?)
    }

    async fn init_repositories(config: &AppConfig) -> anyhow::Result<Arc<dyn RepositoryFactory>> {
        Ok(match config.backend() {
            BackendKind::Relational => {
                let database = config.database();
                let pool = PgPoolManager::connect(
                    database.url(),
                    database.max_pool_size(),
                    database.acquire_timeout(),
                    database.pg_ssl_mode()?,
                )
                .await?;
                Arc::new(RelationalRepositoryFactory::new(pool.get_pool()))
            }
            BackendKind::EmbeddedKv => {
                Arc::new(KvRepositoryFactory::open(config.embedded_backend().path())?)
            }
            BackendKind::Memory => Arc::new(MemoryRepositoryFactory::new()),
        })
    }

    fn init_smtp_transport(config: &AppConfig) -> anyhow::Result<DefaultSmtpTransport> {
        let mail = config.mail();
        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(mail.smtp_host())?
                .credentials(Credentials::new(
                    mail.smtp_user().to_owned(),
                    mail.smtp_passwd().to_owned(),
                ))
                .build(),
        )
    }

    pub async fn new() -> anyhow::Result<Self> {
        let config = Arc::new(Self::init_config()?);
        let repositories = Self::init_repositories(&config).await?;
        Ok(Self {
            default_smtp_transport: Arc::new(Self::init_smtp_transport(&config)?),
            config,
            repositories,
        })
    }
}

impl<T> ConfigProvider for AppState<T>
where
    T: Send + Sync,
{
    fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }
}

fn normalized_to_lettre(message: NormalizedMessage) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(message.from.parse().map_err(|_| MailError(format!("invalid from address: {}", message.from)))?)
        .to(message.to.parse().map_err(|_| MailError(format!("invalid to address: {}", message.to)))?)
        .subject(message.subject);
    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(
            reply_to
                .parse()
                .map_err(|_| MailError(format!("invalid reply-to address: {reply_to}")))?,
        );
    }
    let body = message
        .html
        .or(message.text)
        .ok_or_else(|| MailError("message has neither an html nor a text body".to_string()))?;
    builder
        .body(body)
        .map_err(|e| MailError(format!("failed to build message: {e}")))
}

#[async_trait]
impl MailProvider for AppState<DefaultSmtpTransport> {
    async fn send(&self, message: NormalizedMessage) -> Result<(), MailError> {
        let message = normalized_to_lettre(message)?;
        self.default_smtp_transport
            .send(message)
            .await
            .map_err(|e| MailError(e.to_string()))?;
        Ok(())
    }
}
