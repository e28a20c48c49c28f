//! Application Configuration
//!
//! Configuration for the Auth application layer. Values are read from the
//! environment by the composition root; this type only carries them.

use std::time::Duration;

/// Behavior when the denylist store is unreachable.
///
/// The deployment must choose one; there is no implicit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenylistOutagePolicy {
    /// Treat every token as revoked while the store is down. Conservative:
    /// authenticated traffic stops rather than revoked tokens passing.
    #[default]
    FailClosed,
    /// Treat lookups as not-revoked while the store is down, and raise an
    /// operational alarm through the logs.
    FailOpen,
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric signing secret for bearer tokens (>= 32 bytes; length is
    /// enforced at `TokenCodec` construction, failing startup)
    pub jwt_secret: Vec<u8>,
    /// Token lifetime (default 1 hour)
    pub token_validity: Duration,
    /// Failed logins before lockout (default 5)
    pub max_failed_attempts: u32,
    /// Key prefix for denylist entries
    pub denylist_key_prefix: String,
    /// Denylist behavior on store outage
    pub denylist_outage: DenylistOutagePolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            token_validity: Duration::from_millis(3_600_000),
            max_failed_attempts: 5,
            denylist_key_prefix: "blacklist:jwt:".to_string(),
            denylist_outage: DenylistOutagePolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development/tests)
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }
}
