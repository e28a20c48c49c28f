//! Bearer Token Codec (JWS, HS256)
//!
//! Signs and verifies the stateless bearer tokens used for API
//! authentication. Claims: `sub` (username), `role`, `iss`, `iat`, `exp`.
//!
//! Verification failures are deliberately opaque: signature, issuer, and
//! expiry problems all collapse into [`TokenError::InvalidToken`] so that
//! callers (and logs) cannot distinguish which check failed.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Fixed issuer claim embedded in and required of every token.
pub const ISSUER: &str = "neurixa";

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Token errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The configured secret is missing or shorter than 256 bits.
    #[error("Signing secret must be at least {MIN_SECRET_BYTES} bytes (got {actual})")]
    WeakSecret { actual: usize },

    /// The token failed verification. Single opaque kind; no
    /// sub-categorization is surfaced.
    #[error("Invalid token")]
    InvalidToken,

    /// Signing failed (should not happen with a valid key).
    #[error("Token signing failed")]
    Signing,
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account username
    pub sub: String,
    /// Role code at issuance time
    pub role: String,
    /// Issuer, always [`ISSUER`]
    pub iss: String,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

/// Signs, verifies, and extracts claims from bearer tokens.
///
/// The signing key is read-only after construction.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenCodec {
    /// Create a codec from a symmetric secret and a token lifetime.
    ///
    /// Fails when the secret is shorter than [`MIN_SECRET_BYTES`]; the
    /// composition root is expected to treat this as a startup error.
    pub fn new(secret: &[u8], validity: Duration) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::WeakSecret {
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity,
        })
    }

    /// Configured token lifetime.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a token for the given subject and role.
    pub fn sign(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + self.validity.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify signature, issuer, and expiry; return the claims.
    ///
    /// The expiry must be strictly in the future. Every failure mode maps
    /// to the same opaque error.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::InvalidToken)?;

        // The library accepts exp == now; the contract is strict.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Declared expiry of a parseable, correctly signed token.
    ///
    /// Does not check expiry or issuer; intended for logout, after a prior
    /// successful [`Self::verify`], where the expiry of an already-accepted
    /// token bounds the denylist TTL.
    pub fn expiry_of(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::InvalidToken)?;

        Utc.timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or(TokenError::InvalidToken)
    }
}
