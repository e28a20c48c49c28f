//! Request Authenticator
//!
//! Runs in front of every route. A valid, non-revoked bearer token attaches
//! an [`AuthPrincipal`] to the request; anything else lets the request
//! continue unauthenticated, and protected handlers reject downstream with
//! 401/403. A missing header, a bad signature, and a revoked token are
//! indistinguishable in the logs: only a rejection counter is kept.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::{HeaderMap, Request, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use platform::token::TokenCodec;

use crate::domain::repository::TokenDenylist;
use crate::domain::value_object::role::Role;
use crate::error::AuthError;

/// Request-scoped view of the authenticated account.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    /// Token subject
    pub username: String,
    /// Role claim carried by the token
    pub role: Role,
}

impl AuthPrincipal {
    /// Gate for administrative endpoints.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.role.is_admin_or_higher() {
            Ok(())
        } else {
            Err(AuthError::Forbidden("Administrator privileges required"))
        }
    }
}

/// Extracting a principal in a handler rejects with 401 when the
/// authenticator did not attach one.
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPrincipal>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Authenticator state shared across requests.
#[derive(Clone)]
pub struct AuthenticatorState<D>
where
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    pub codec: Arc<TokenCodec>,
    pub denylist: Arc<D>,
    pub rejected: Arc<AtomicU64>,
}

impl<D> AuthenticatorState<D>
where
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    pub fn new(codec: Arc<TokenCodec>, denylist: Arc<D>) -> Self {
        Self {
            codec,
            denylist,
            rejected: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Per-request authentication middleware.
pub async fn authenticate<D>(
    State(state): State<AuthenticatorState<D>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    // Exactly one principal attachment per request; re-running on an
    // already-authenticated request is a no-op.
    if req.extensions().get::<AuthPrincipal>().is_some() {
        return next.run(req).await;
    }

    if let Some(principal) = resolve_principal(&state, req.headers()).await {
        req.extensions_mut().insert(principal);
    } else if req.headers().contains_key(header::AUTHORIZATION) {
        let rejected = state.rejected.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(rejected_total = rejected, "Bearer token rejected");
    }

    next.run(req).await
}

async fn resolve_principal<D>(
    state: &AuthenticatorState<D>,
    headers: &HeaderMap,
) -> Option<AuthPrincipal>
where
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    let claims = state.codec.verify(token).ok()?;

    if state.denylist.is_revoked(token).await.unwrap_or(true) {
        return None;
    }

    let role = Role::from_code(&claims.role)?;

    Some(AuthPrincipal {
        username: claims.sub,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let user = AuthPrincipal {
            username: "alice".to_string(),
            role: Role::User,
        };
        assert!(user.require_admin().is_err());

        let admin = AuthPrincipal {
            username: "root".to_string(),
            role: Role::Admin,
        };
        assert!(admin.require_admin().is_ok());

        let super_admin = AuthPrincipal {
            username: "root".to_string(),
            role: Role::SuperAdmin,
        };
        assert!(super_admin.require_admin().is_ok());
    }
}
