//! Session/transaction discipline for the relational backend (§4.4.1,
//! §4.4.3): every operation runs inside a transaction that sets the RLS
//! session variables with `SET LOCAL` before doing anything else, and is
//! rolled back on any error so a failed session-variable assignment never
//! leaves a connection in a half-scoped state.

use crate::error::{RepositoryError, RepositoryResult};
use crate::identity::Context;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, trace};

/// Begins a transaction and sets `app.current_tenant_id` / `app.current_user_id`
/// from `ctx`. `app.bypass_rls` is left unset (defaults to false via the
/// background-bypass policy's `current_setting(..., true)` null-coalescing).
pub async fn begin_scoped<'a>(
    pool: &PgPool,
    ctx: &Context,
) -> RepositoryResult<Transaction<'a, Postgres>> {
    let mut tx = pool.begin().await?;
    let tenant_id = ctx.tenant_id().ok_or(RepositoryError::IdentityMissing)?;
    let user_id = ctx.user_id().ok_or(RepositoryError::IdentityMissing)?;

    set_local(&mut tx, "app.current_tenant_id", &tenant_id.to_string()).await?;
    set_local(&mut tx, "app.current_user_id", &user_id.to_string()).await?;
    Ok(tx)
}

/// Begins a transaction with `app.bypass_rls` set, for the service registry
/// (§4.3, §9). The caller is responsible for having logged the audit reason
/// before reaching this point — see `RepositoryFactory::create_service_registry`.
pub async fn begin_bypass<'a>(pool: &PgPool) -> RepositoryResult<Transaction<'a, Postgres>> {
    let mut tx = pool.begin().await?;
    set_local(&mut tx, "app.bypass_rls", "on").await?;
    Ok(tx)
}

/// Sets a session-local variable via `set_config`, binding both the name
/// and value as parameters rather than interpolating either into SQL text
/// (§6.4). `SET LOCAL` itself takes no bind parameters, so `set_config`
/// with `is_local = true` is the parameterizable equivalent.
async fn set_local(tx: &mut Transaction<'_, Postgres>, name: &str, value: &str) -> RepositoryResult<()> {
    trace!(variable = name, "setting session-local variable");
    sqlx::query("SELECT set_config($1, $2, true)")
        .bind(name)
        .bind(value)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            error!(variable = name, error = %e, "failed to set session-local variable");
            RepositoryError::from(e)
        })?;
    Ok(())
}

/// Commits `tx` on `Ok`, rolls it back on `Err`, and returns the original
/// result either way (§4.4.3's `rollback_or_commit` helper).
pub async fn rollback_or_commit<T>(
    tx: Transaction<'_, Postgres>,
    result: RepositoryResult<T>,
) -> RepositoryResult<T> {
    match &result {
        Ok(_) => {
            tx.commit().await?;
        }
        Err(_) => {
            tx.rollback().await?;
        }
    }
    result
}
