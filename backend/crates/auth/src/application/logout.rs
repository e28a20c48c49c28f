//! Logout Use Case
//!
//! Revokes the presented bearer token for the remainder of its lifetime.

use std::sync::Arc;

use platform::token::TokenCodec;

use crate::domain::repository::TokenDenylist;
use crate::error::{AuthError, AuthResult};

/// Logout use case
pub struct LogoutUseCase<D>
where
    D: TokenDenylist,
{
    codec: Arc<TokenCodec>,
    denylist: Arc<D>,
}

impl<D> LogoutUseCase<D>
where
    D: TokenDenylist,
{
    pub fn new(codec: Arc<TokenCodec>, denylist: Arc<D>) -> Self {
        Self { codec, denylist }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        // Only tokens that would authenticate can be revoked; anything else
        // is a client error on this endpoint.
        self.codec
            .verify(token)
            .map_err(|_| AuthError::InvalidInput("Invalid or expired token".to_string()))?;

        let expires_at = self
            .codec
            .expiry_of(token)
            .map_err(|_| AuthError::InvalidInput("Invalid or expired token".to_string()))?;

        self.denylist.revoke(token, expires_at).await?;

        tracing::info!("Bearer token revoked");
        Ok(())
    }
}
