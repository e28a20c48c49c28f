//! Login Use Case
//!
//! Verifies credentials, maintains the failed-attempt counter, and issues
//! a bearer token on success.
//!
//! Unknown username and wrong password produce the same error value, and
//! an absent account still pays for one hash verification, so response
//! timing and message reveal nothing about which usernames exist.

use std::sync::Arc;

use platform::password::{RawPassword, dummy_hash};
use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::error::{AuthError, AuthResult};

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub account: Account,
    pub token: String,
}

/// Login use case
pub struct LoginUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<S> LoginUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    pub async fn execute(&self, username: &str, password: String) -> AuthResult<LoginOutput> {
        // A password that cannot pass the policy cannot match any stored
        // credential; same opaque error as a mismatch.
        let raw = RawPassword::new(password).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self.store.find_by_username(username).await?;

        let Some(account) = account else {
            // Burn the same hashing cost as the found-user path
            let _ = dummy_hash().verify(&raw);
            return Err(AuthError::InvalidCredentials);
        };

        if account.is_locked() {
            return Err(AuthError::Locked);
        }

        if !account.password_hash().verify(&raw) {
            let failed = account.record_failed_login(self.config.max_failed_attempts);
            self.store.save(&failed).await?;
            return Err(AuthError::InvalidCredentials);
        }

        let account = if account.failed_login_attempts() > 0 {
            let reset = account.reset_failed_login();
            self.store.save(&reset).await?;
            reset
        } else {
            account
        };

        let token = self
            .codec
            .sign(account.username().as_str(), account.role().code())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(account_id = %account.id(), "Login succeeded");

        Ok(LoginOutput { account, token })
    }
}
