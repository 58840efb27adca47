//! Process entry point. HTTP routing of entity endpoints is out of scope
//! for this crate (SPEC_FULL.md §D) — this binary only proves the wiring
//! the core promises an HTTP layer: configuration, backend selection,
//! startup schema migration, and graceful shutdown. A real deployment
//! mounts its own routers in front of the repository factory this process
//! builds.

use axum::routing::get;
use axum::Router;
use palisade_core::app::init::{init_default_app, init_subscriber};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let app_state = init_default_app().await?;

    let addr = format!(
        "{}:{}",
        app_state.config.server().host(),
        app_state.config.server().port()
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = Router::new().route("/healthz", get(|| async { "ok" }));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
