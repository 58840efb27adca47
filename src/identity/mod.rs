//! C1 — identity context propagation.
//!
//! The identity context is carried as an explicit first parameter of every
//! repository method rather than smuggled through process-wide state (§9,
//! "Context propagation"). A background worker builds its own `Context` from
//! the job record it is processing instead of from an inbound request.

use crate::error::{RepositoryError, RepositoryResult};
use uuid::Uuid;

/// The authenticated principal, as resolved by the HTTP layer (or a
/// background worker) before any repository call. Deliberately minimal —
/// only what RLS and validators need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

/// A value bag carried implicitly through the call chain in the reference
/// implementation's source language; here it is an explicit, cheaply
/// cloneable struct passed by reference into every repository method.
#[derive(Debug, Clone, Default)]
pub struct Context {
    user: Option<AuthenticatedUser>,
}

impl Context {
    /// An anonymous context, e.g. at the very start of request handling
    /// before authentication has run.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// Build a context already bearing the given identity — the shape a
    /// background worker uses, reading identity from its job record rather
    /// than an inbound request.
    pub fn for_job(user: AuthenticatedUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.user_id)
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.tenant_id)
    }
}

/// Returns the authenticated user carried by `ctx`, or `None`.
pub fn user_from_context(ctx: &Context) -> Option<&AuthenticatedUser> {
    ctx.user.as_ref()
}

/// Returns the authenticated user carried by `ctx`, or `IdentityMissing`.
pub fn require_user_from_context(ctx: &Context) -> RepositoryResult<&AuthenticatedUser> {
    user_from_context(ctx).ok_or(RepositoryError::IdentityMissing)
}

/// Derives a child context bearing `user`. The parent is left untouched —
/// contexts are cheap, immutable values, not a mutable ambient cell.
pub fn with_user(mut ctx: Context, user: AuthenticatedUser) -> Context {
    ctx.user = Some(user);
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(tenant: Uuid, id: Uuid) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: id,
            tenant_id: tenant,
        }
    }

    #[test]
    fn anonymous_context_has_no_user() {
        let ctx = Context::anonymous();
        assert!(user_from_context(&ctx).is_none());
        assert!(require_user_from_context(&ctx).is_err());
    }

    #[test]
    fn with_user_derives_populated_context() {
        let base = Context::anonymous();
        let u = user(Uuid::new_v4(), Uuid::new_v4());
        let derived = with_user(base, u.clone());
        assert_eq!(user_from_context(&derived), Some(&u));
    }

    #[test]
    fn for_job_builds_context_from_job_record() {
        let u = user(Uuid::new_v4(), Uuid::new_v4());
        let ctx = Context::for_job(u.clone());
        assert_eq!(require_user_from_context(&ctx).unwrap(), &u);
    }
}
