//! Auth (Accounts & Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account aggregate, value objects, store ports
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL / Redis / in-memory store implementations
//! - `presentation/` - HTTP handlers, DTOs, router, request authenticator
//!
//! ## Features
//! - Registration and login with username + password
//! - Stateless bearer tokens (JWS HS256) with logout via a TTL-bounded
//!   denylist of token digests
//! - Role-based administration (USER, ADMIN, SUPER_ADMIN) with safety
//!   invariants: SUPER_ADMIN is indelible and terminal, the last ADMIN
//!   cannot be deleted, users may delete only themselves
//! - Account lockout after repeated failed logins
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Login errors never reveal whether a username exists
//! - Revoked tokens are stored as digests, never as raw token material
//! - A demoted administrator's stale token is rejected on role changes

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, DenylistOutagePolicy};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgUserStore;
pub use infra::redis::RedisTokenDenylist;
pub use presentation::router::api_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::account::*;
    pub use crate::domain::page::*;
    pub use crate::domain::value_object::account_id::*;
    pub use crate::domain::value_object::email::*;
    pub use crate::domain::value_object::role::*;
    pub use crate::domain::value_object::username::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
