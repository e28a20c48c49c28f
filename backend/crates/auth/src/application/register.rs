//! Register Use Case
//!
//! Creates a new account with a hashed credential.

use std::sync::Arc;

use platform::password::RawPassword;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::{email::Email, role::Role, username::Username};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> RegisterUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Account> {
        // Field validation maps to 400, not to an aggregate state error
        let username = Username::new(input.username)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let email =
            Email::new(input.email).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let password = RawPassword::new(input.password)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        // Uniqueness checks before paying for the hash
        if self
            .store
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(format!(
                "Username already exists: {username}"
            )));
        }
        if self.store.find_by_email(email.as_str()).await?.is_some() {
            return Err(AuthError::Conflict(format!(
                "Email already exists: {email}"
            )));
        }

        let password_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = Account::create(username, email, password_hash, Role::User);
        self.store.save(&account).await?;

        tracing::info!(
            account_id = %account.id(),
            username = %account.username(),
            "Account registered"
        );

        Ok(account)
    }
}
