//! Export job state machine (§4.11, §8.2 scenario 4), exercised against the
//! in-memory backend.

use chrono::Utc;
use palisade_core::backend::memory::MemoryRepositoryFactory;
use palisade_core::entity::{Export, ExportStatus, Role, Tenant, TenantStatus, User};
use palisade_core::error::RepositoryError;
use palisade_core::identity::{with_user, AuthenticatedUser, Context};
use palisade_core::repository::RepositoryFactory;
use uuid::Uuid;

async fn seed_user(factory: &MemoryRepositoryFactory) -> Context {
    let admin = Context::anonymous();
    let service = factory
        .create_service_registry(&admin, "test fixture setup")
        .unwrap();

    let tenant = service
        .tenants
        .create(
            &admin,
            Tenant {
                id: Uuid::nil(),
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                domain: None,
                status: TenantStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let user = service
        .users
        .create(
            &admin,
            User {
                id: Uuid::nil(),
                tenant_id: tenant.id,
                email: "a@example.com".to_string(),
                password_verifier: "verifier".to_string(),
                display_name: "A".to_string(),
                role: Role::Admin,
                active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    with_user(
        Context::anonymous(),
        AuthenticatedUser {
            user_id: user.id,
            tenant_id: tenant.id,
        },
    )
}

fn new_export() -> Export {
    Export {
        id: Uuid::nil(),
        tenant_id: Uuid::nil(),
        requested_by: Uuid::nil(),
        status: ExportStatus::Pending,
        bucket_key: None,
        error_message: None,
        completed_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn export_progresses_from_pending_to_completed_with_bucket_key() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();
    assert_eq!(export.status, ExportStatus::Pending);

    let export = registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await
        .unwrap();
    assert_eq!(export.status, ExportStatus::InProgress);

    let export = registry
        .exports
        .transition(
            &ctx,
            export.id,
            ExportStatus::Completed,
            Some("exports/acme/1.zip".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(export.status, ExportStatus::Completed);
    assert_eq!(export.bucket_key.as_deref(), Some("exports/acme/1.zip"));
    assert!(export.error_message.is_none());
    assert!(export.completed_date.is_some());
}

#[tokio::test]
async fn completing_without_a_bucket_key_is_rejected() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();
    registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await
        .unwrap();

    let result = registry
        .exports
        .transition(&ctx, export.id, ExportStatus::Completed, None, None)
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
}

#[tokio::test]
async fn export_cannot_skip_in_progress() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();

    let result = registry
        .exports
        .transition(
            &ctx,
            export.id,
            ExportStatus::Completed,
            Some("exports/acme/1.zip".to_string()),
            None,
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
}

#[tokio::test]
async fn export_fails_with_error_message_from_in_progress() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();
    registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await
        .unwrap();

    let export = registry
        .exports
        .transition(
            &ctx,
            export.id,
            ExportStatus::Failed,
            None,
            Some("upload timed out".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(export.status, ExportStatus::Failed);
    assert_eq!(export.error_message.as_deref(), Some("upload timed out"));
}

#[tokio::test]
async fn failing_without_an_error_message_is_rejected() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();
    registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await
        .unwrap();

    let result = registry
        .exports
        .transition(&ctx, export.id, ExportStatus::Failed, None, None)
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
}

#[tokio::test]
async fn completed_export_cannot_transition_further() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let export = registry.exports.create(&ctx, new_export()).await.unwrap();
    registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await
        .unwrap();
    registry
        .exports
        .transition(
            &ctx,
            export.id,
            ExportStatus::Completed,
            Some("exports/acme/1.zip".to_string()),
            None,
        )
        .await
        .unwrap();

    let result = registry
        .exports
        .transition(&ctx, export.id, ExportStatus::InProgress, None, None)
        .await;
    assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
}
