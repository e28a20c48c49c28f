//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::domain::repository::{TokenDenylist, UserStore};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthenticatorState, authenticate};

/// Build the full API router for any store/denylist implementation.
///
/// The authenticator layer runs in front of every route; protected
/// handlers reject unauthenticated requests themselves.
pub fn api_router<S, D>(
    store: Arc<S>,
    denylist: Arc<D>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
) -> Router
where
    S: UserStore + Clone + Send + Sync + 'static,
    D: TokenDenylist + Clone + Send + Sync + 'static,
{
    let authenticator = AuthenticatorState::new(codec.clone(), denylist.clone());

    let state = AuthAppState {
        store,
        denylist,
        codec,
        config,
    };

    Router::new()
        .route("/api/auth/register", post(handlers::register::<S, D>))
        .route("/api/auth/login", post(handlers::login::<S, D>))
        .route("/api/auth/logout", post(handlers::logout::<S, D>))
        .route("/api/users/me", get(handlers::me::<S, D>))
        .route("/api/admin/users", get(handlers::list_users::<S, D>))
        .route(
            "/api/admin/users/{id}",
            put(handlers::update_user::<S, D>).delete(handlers::delete_user::<S, D>),
        )
        .route(
            "/api/admin/users/{id}/lock",
            post(handlers::lock_user::<S, D>),
        )
        .route(
            "/api/admin/users/{id}/unlock",
            post(handlers::unlock_user::<S, D>),
        )
        .route(
            "/api/admin/users/{id}/reset-failed-login",
            post(handlers::reset_failed_login::<S, D>),
        )
        .route(
            "/api/admin/users/{id}/role",
            put(handlers::change_role::<S, D>),
        )
        .layer(middleware::from_fn_with_state(
            authenticator,
            authenticate::<D>,
        ))
        .with_state(state)
}
