//! Cross-tenant and cross-user isolation properties (§8.1), exercised
//! against the in-memory backend since it needs no external process to
//! run.

use chrono::Utc;
use palisade_core::backend::memory::MemoryRepositoryFactory;
use palisade_core::entity::{Area, Commodity, CommodityStatus, Location, Role, Tenant, TenantStatus, User};
use palisade_core::error::RepositoryError;
use palisade_core::identity::{with_user, AuthenticatedUser, Context};
use palisade_core::repository::{RepositoryFactory, UserRegistry};
use bigdecimal::BigDecimal;
use sqlx::types::Json;
use uuid::Uuid;

fn commodity(area_id: Uuid, name: &str, count: i32, status: CommodityStatus, draft: bool) -> Commodity {
    Commodity {
        id: Uuid::nil(),
        tenant_id: Uuid::nil(),
        area_id,
        name: name.to_string(),
        short_name: None,
        commodity_type: None,
        count,
        price: BigDecimal::from(10),
        currency: "USD".to_string(),
        status,
        serial_numbers: Json(Vec::new()),
        tags: Json(Vec::new()),
        urls: Json(Vec::new()),
        comments: None,
        draft,
        purchase_date: None,
        warranty_expires_date: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn admin_ctx() -> Context {
    Context::anonymous()
}

async fn seed_tenant(factory: &MemoryRepositoryFactory, name: &str) -> (Tenant, User) {
    let service = factory
        .create_service_registry(&admin_ctx(), "test fixture setup")
        .unwrap();

    let tenant = service
        .tenants
        .create(
            &admin_ctx(),
            Tenant {
                id: Uuid::nil(),
                name: name.to_string(),
                slug: name.to_lowercase().replace(' ', "-"),
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
            &admin_ctx(),
            User {
                id: Uuid::nil(),
                tenant_id: tenant.id,
                email: format!("{}@example.com", name.to_lowercase()),
                password_verifier: "verifier".to_string(),
                display_name: name.to_string(),
                role: Role::Admin,
                active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    (tenant, user)
}

fn ctx_for(tenant: &Tenant, user: &User) -> Context {
    with_user(
        Context::anonymous(),
        AuthenticatedUser {
            user_id: user.id,
            tenant_id: tenant.id,
        },
    )
}

async fn seed_location(registry: &UserRegistry, ctx: &Context, name: &str) -> Location {
    registry
        .locations
        .create(
            ctx,
            Location {
                id: Uuid::nil(),
                tenant_id: Uuid::nil(),
                name: name.to_string(),
                address: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn identity_is_required_to_obtain_a_user_registry() {
    let factory = MemoryRepositoryFactory::new();
    let result = factory.create_user_registry(&Context::anonymous());
    assert!(matches!(result, Err(RepositoryError::IdentityMissing)));
}

#[tokio::test]
async fn create_assigns_the_caller_tenant_not_the_supplied_one() {
    let factory = MemoryRepositoryFactory::new();
    let (tenant, user) = seed_tenant(&factory, "Acme").await;
    let ctx = ctx_for(&tenant, &user);
    let registry = factory.create_user_registry(&ctx).unwrap();

    // the caller passes a nil tenant_id; the backend must stamp its own.
    let location = seed_location(&registry, &ctx, "Warehouse").await;
    assert_eq!(location.tenant_id, tenant.id);
    assert_ne!(location.tenant_id, Uuid::nil());
}

#[tokio::test]
async fn locations_are_invisible_across_tenants() {
    let factory = MemoryRepositoryFactory::new();
    let (tenant_a, user_a) = seed_tenant(&factory, "Acme").await;
    let (tenant_b, user_b) = seed_tenant(&factory, "Globex").await;

    let ctx_a = ctx_for(&tenant_a, &user_a);
    let registry_a = factory.create_user_registry(&ctx_a).unwrap();
    let location = seed_location(&registry_a, &ctx_a, "Warehouse").await;

    let ctx_b = ctx_for(&tenant_b, &user_b);
    let registry_b = factory.create_user_registry(&ctx_b).unwrap();

    let get_result = registry_b.locations.get(&ctx_b, location.id).await;
    assert!(get_result.unwrap_err().is_not_found());

    let listed = registry_b.locations.list(&ctx_b).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn locations_are_invisible_across_users_within_the_same_tenant() {
    let factory = MemoryRepositoryFactory::new();
    let (tenant, user_a) = seed_tenant(&factory, "Acme").await;

    let service = factory
        .create_service_registry(&admin_ctx(), "seed second user")
        .unwrap();
    let user_b = service
        .users
        .create(
            &admin_ctx(),
            User {
                id: Uuid::nil(),
                tenant_id: tenant.id,
                email: "second@example.com".to_string(),
                password_verifier: "verifier".to_string(),
                display_name: "Second".to_string(),
                role: Role::User,
                active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let ctx_a = ctx_for(&tenant, &user_a);
    let registry_a = factory.create_user_registry(&ctx_a).unwrap();
    let location = seed_location(&registry_a, &ctx_a, "Warehouse").await;

    let ctx_b = ctx_for(&tenant, &user_b);
    let registry_b = factory.create_user_registry(&ctx_b).unwrap();

    assert!(registry_b
        .locations
        .get(&ctx_b, location.id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn deleting_a_location_with_areas_is_prevented() {
    let factory = MemoryRepositoryFactory::new();
    let (tenant, user) = seed_tenant(&factory, "Acme").await;
    let ctx = ctx_for(&tenant, &user);
    let registry = factory.create_user_registry(&ctx).unwrap();

    let location = seed_location(&registry, &ctx, "Warehouse").await;
    registry
        .areas
        .create(
            &ctx,
            Area {
                id: Uuid::nil(),
                tenant_id: Uuid::nil(),
                location_id: location.id,
                name: "Aisle 1".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let delete_result = registry.locations.delete(&ctx, location.id).await;
    assert!(matches!(
        delete_result,
        Err(RepositoryError::CannotDelete(_))
    ));
}

#[tokio::test]
async fn total_worth_excludes_draft_and_non_in_use_commodities() {
    let factory = MemoryRepositoryFactory::new();
    let (tenant, user) = seed_tenant(&factory, "Acme").await;
    let ctx = ctx_for(&tenant, &user);
    let registry = factory.create_user_registry(&ctx).unwrap();

    let location = seed_location(&registry, &ctx, "Warehouse").await;
    let area = registry
        .areas
        .create(
            &ctx,
            Area {
                id: Uuid::nil(),
                tenant_id: Uuid::nil(),
                location_id: location.id,
                name: "Aisle 1".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let counted = registry
        .commodities
        .create(
            &ctx,
            commodity(area.id, "Counted Widget", 2, CommodityStatus::InUse, false),
        )
        .await
        .unwrap();
    assert!(counted.counts_toward_worth());

    registry
        .commodities
        .create(
            &ctx,
            commodity(area.id, "Draft Widget", 100, CommodityStatus::InUse, true),
        )
        .await
        .unwrap();

    registry
        .commodities
        .create(
            &ctx,
            commodity(area.id, "Disposed Widget", 100, CommodityStatus::Disposed, false),
        )
        .await
        .unwrap();

    let worth = registry.areas.total_worth(&ctx, area.id).await.unwrap();
    assert_eq!(worth.amount, BigDecimal::from(20));
    assert_eq!(worth.currency, "USD");
}
