//! Get User Use Case
//!
//! Lookup by username, for the current-principal endpoint and for admin
//! handlers that need the requestor's persisted account.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::UserStore;
use crate::error::{AuthError, AuthResult};

pub struct GetUserByUsernameUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> GetUserByUsernameUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, username: &str) -> AuthResult<Account> {
        self.store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User not found: {username}")))
    }
}
