//! Bounded per-user concurrency slots (§5), exercised against the
//! in-memory backend.

use chrono::{Duration, Utc};
use palisade_core::backend::memory::MemoryRepositoryFactory;
use palisade_core::entity::{Role, Tenant, TenantStatus, User};
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

#[tokio::test]
async fn acquiring_beyond_max_slots_is_rejected() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    let first = registry
        .concurrency_slots
        .acquire_slot(&ctx, "export", 1, Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(first.job_kind, "export");

    let second = registry
        .concurrency_slots
        .acquire_slot(&ctx, "export", 1, Duration::minutes(5))
        .await;
    assert!(matches!(
        second,
        Err(RepositoryError::ResourceLimitExceeded(_))
    ));

    registry
        .concurrency_slots
        .release_slot(&ctx, first.id)
        .await
        .unwrap();

    let third = registry
        .concurrency_slots
        .acquire_slot(&ctx, "export", 1, Duration::minutes(5))
        .await;
    assert!(third.is_ok());
}

#[tokio::test]
async fn concurrent_acquires_never_exceed_max_slots() {
    let factory = std::sync::Arc::new(MemoryRepositoryFactory::new());
    let ctx = seed_user(&factory).await;
    let registry = std::sync::Arc::new(factory.create_user_registry(&ctx).unwrap());

    let max_slots = 3u32;
    let mut handles = Vec::new();
    for _ in 0..10 {
        let registry = registry.clone();
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            registry
                .concurrency_slots
                .acquire_slot(&ctx, "import", max_slots, Duration::minutes(5))
                .await
        }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            granted += 1;
        }
    }

    assert_eq!(granted, max_slots as usize);
    let active = registry.concurrency_slots.count_active(&ctx).await.unwrap();
    assert_eq!(active, max_slots);
}

#[tokio::test]
async fn cleanup_expired_slots_frees_capacity() {
    let factory = MemoryRepositoryFactory::new();
    let ctx = seed_user(&factory).await;
    let registry = factory.create_user_registry(&ctx).unwrap();

    registry
        .concurrency_slots
        .acquire_slot(&ctx, "export", 1, Duration::milliseconds(1))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let removed = registry.concurrency_slots.cleanup_expired_slots().await.unwrap();
    assert_eq!(removed, 1);

    let granted = registry
        .concurrency_slots
        .acquire_slot(&ctx, "export", 1, Duration::minutes(5))
        .await;
    assert!(granted.is_ok());
}
