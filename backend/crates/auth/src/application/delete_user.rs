//! Delete User Use Case
//!
//! Safety rules, checked strictly in this order:
//! 1. the target must exist;
//! 2. SUPER_ADMIN accounts can never be deleted;
//! 3. a regular USER may only delete their own account;
//! 4. the last ADMIN cannot be deleted while no SUPER_ADMIN exists.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::{AuthError, AuthResult};

pub struct DeleteUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> DeleteUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, target_id: &AccountId, requestor: &Account) -> AuthResult<()> {
        let target = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User not found: {target_id}")))?;

        if target.role().is_super_admin() {
            return Err(AuthError::Forbidden("SUPER_ADMIN accounts cannot be deleted"));
        }

        if requestor.role() == Role::User && requestor.id() != target_id {
            return Err(AuthError::Forbidden(
                "Users may only delete their own account",
            ));
        }

        if target.role() == Role::Admin {
            let admin_count = self.store.count_by_role(Role::Admin).await?;
            let super_admin_count = self.store.count_by_role(Role::SuperAdmin).await?;
            if admin_count <= 1 && super_admin_count == 0 {
                return Err(AuthError::Forbidden("Cannot delete the last ADMIN"));
            }
        }

        self.store.delete_by_id(target_id).await?;

        tracing::info!(target_id = %target_id, "Account deleted");
        Ok(())
    }
}
