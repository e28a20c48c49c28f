//! Redis Token Denylist
//!
//! Revoked tokens are stored under `prefix || hex(SHA-256(token))` with a
//! TTL bounded by the token's own expiry. The raw token never reaches the
//! store: a compromised cache must not yield replayable credentials.

use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};

use platform::crypto::sha256_hex;

use crate::application::config::DenylistOutagePolicy;
use crate::domain::repository::TokenDenylist;
use crate::error::AuthResult;

/// Sentinel value stored for revoked tokens.
const REVOKED_VALUE: &str = "1";

/// Minimum TTL; an already-expired token still blocks any racing request
/// that read the clock a moment earlier.
const MIN_TTL_MS: i64 = 1_000;

/// Redis-backed token denylist
#[derive(Clone)]
pub struct RedisTokenDenylist {
    conn: ConnectionManager,
    key_prefix: String,
    outage: DenylistOutagePolicy,
}

impl RedisTokenDenylist {
    pub fn new(conn: ConnectionManager, key_prefix: String, outage: DenylistOutagePolicy) -> Self {
        Self {
            conn,
            key_prefix,
            outage,
        }
    }

    fn key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, sha256_hex(token.as_bytes()))
    }
}

impl TokenDenylist for RedisTokenDenylist {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AuthResult<()> {
        let ttl_ms = (expires_at - Utc::now()).num_milliseconds().max(MIN_TTL_MS);

        // SET with PX; overwriting an existing entry is a no-op in effect
        let mut conn = self.conn.clone();
        let _: () = conn
            .pset_ex(self.key(token), REVOKED_VALUE, ttl_ms as u64)
            .await?;

        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        match conn.exists::<_, bool>(self.key(token)).await {
            Ok(exists) => Ok(exists),
            Err(e) => match self.outage {
                // Conservative: revoked tokens must not pass while the
                // store is down, so every token is treated as revoked.
                DenylistOutagePolicy::FailClosed => {
                    tracing::error!(error = %e, "Denylist store unreachable, failing closed");
                    Ok(true)
                }
                DenylistOutagePolicy::FailOpen => {
                    tracing::error!(error = %e, "Denylist store unreachable, failing open");
                    Ok(false)
                }
            },
        }
    }
}
