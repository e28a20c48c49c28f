//! Change Role Use Case
//!
//! Role changes are gated three ways: the session-freshness check (the
//! token's role claim must match the requestor's persisted role), the
//! authorization matrix below, and the aggregate's own promote rules.
//!
//! Authorization matrix (requestor role → roles it may assign):
//!
//! | requestor   | may set            |
//! |-------------|--------------------|
//! | USER        | nothing            |
//! | ADMIN       | USER, ADMIN        |
//! | SUPER_ADMIN | USER, ADMIN, SUPER_ADMIN |

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::{AuthError, AuthResult};

/// Whether `requestor` may assign `new_role` at all.
pub fn role_change_permitted(requestor: Role, new_role: Role) -> bool {
    match requestor {
        Role::SuperAdmin => true,
        Role::Admin => matches!(new_role, Role::User | Role::Admin),
        Role::User => false,
    }
}

pub struct ChangeUserRoleUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> ChangeUserRoleUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `token_role` is the role claim of the validated bearer token; a
    /// just-demoted administrator must not exercise stale authority.
    pub async fn execute(
        &self,
        target_id: &AccountId,
        new_role: Role,
        requestor: &Account,
        token_role: Role,
    ) -> AuthResult<Account> {
        if token_role != requestor.role() {
            return Err(AuthError::StaleSession);
        }

        let target = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User not found: {target_id}")))?;

        if target.role().is_super_admin() {
            return Err(AuthError::Forbidden("SUPER_ADMIN role cannot be changed"));
        }

        if !role_change_permitted(requestor.role(), new_role) {
            return Err(AuthError::Forbidden(
                "Insufficient permissions to change role",
            ));
        }

        let updated = target.promote(new_role)?;
        self.store.save(&updated).await?;

        tracing::info!(
            target_id = %updated.id(),
            new_role = %updated.role(),
            "Role changed"
        );

        Ok(updated)
    }
}
