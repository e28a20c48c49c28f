//! Update User Use Case
//!
//! Admin update of email and/or role. A role change goes through the same
//! authorization matrix as the dedicated role endpoint; an email change
//! drops the verified flag via the aggregate.

use std::sync::Arc;

use crate::application::change_role::role_change_permitted;
use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{account_id::AccountId, email::Email, role::Role};
use crate::error::{AuthError, AuthResult};

pub struct UpdateUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> UpdateUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        target_id: &AccountId,
        email: Option<String>,
        role: Option<Role>,
        requestor: &Account,
    ) -> AuthResult<Account> {
        let mut account = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User not found: {target_id}")))?;

        if let Some(email) = email {
            let email =
                Email::new(email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
            if &email != account.email() {
                // Duplicate check against other accounts
                if let Some(existing) = self.store.find_by_email(email.as_str()).await? {
                    if existing.id() != account.id() {
                        return Err(AuthError::Conflict(format!(
                            "Email already exists: {email}"
                        )));
                    }
                }
                account = account.change_email(email);
            }
        }

        if let Some(role) = role {
            if role != account.role() {
                if !role_change_permitted(requestor.role(), role) {
                    return Err(AuthError::Forbidden(
                        "Insufficient permissions to change role",
                    ));
                }
                account = account.promote(role)?;
            }
        }

        self.store.save(&account).await?;

        tracing::info!(target_id = %account.id(), "Account updated");
        Ok(account)
    }
}
