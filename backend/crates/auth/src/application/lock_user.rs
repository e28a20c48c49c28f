//! Account State Use Cases
//!
//! Admin-driven lock, unlock, and failed-login reset.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{AuthError, AuthResult};

async fn load<S: UserStore>(store: &S, id: &AccountId) -> AuthResult<Account> {
    store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AuthError::NotFound(format!("User not found: {id}")))
}

pub struct LockUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> LockUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: &AccountId) -> AuthResult<Account> {
        let locked = load(self.store.as_ref(), id).await?.lock();
        self.store.save(&locked).await?;
        tracing::info!(account_id = %id, "Account locked");
        Ok(locked)
    }
}

pub struct UnlockUserUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> UnlockUserUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: &AccountId) -> AuthResult<Account> {
        let unlocked = load(self.store.as_ref(), id).await?.unlock();
        self.store.save(&unlocked).await?;
        tracing::info!(account_id = %id, "Account unlocked");
        Ok(unlocked)
    }
}

pub struct ResetFailedLoginUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> ResetFailedLoginUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, id: &AccountId) -> AuthResult<Account> {
        let reset = load(self.store.as_ref(), id).await?.reset_failed_login();
        self.store.save(&reset).await?;
        tracing::info!(account_id = %id, "Failed-login counter reset");
        Ok(reset)
    }
}
