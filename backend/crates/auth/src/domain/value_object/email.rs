//! Email Value Object
//!
//! Shape validation only; ownership is proven separately by email
//! verification. The address is stored case-preserved and compared
//! case-sensitively, exactly as entered.

use crate::domain::InvalidAccountState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Characters permitted in the local part besides ASCII alphanumerics.
const LOCAL_SPECIAL_CHARS: &[char] = &[
    '_', '!', '#', '$', '%', '&', '\'', '*', '+', '/', '=', '?', '`', '{', '|', '}', '~', '^',
    '.', '-',
];

/// Email address value object
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new email with shape validation.
    pub fn new(input: impl Into<String>) -> Result<Self, InvalidAccountState> {
        let email = input.into();

        if email.len() > EMAIL_MAX_LENGTH || !Self::is_valid_format(&email) {
            return Err(InvalidAccountState("Invalid email format."));
        }

        Ok(Self(email))
    }

    /// `local@domain` with the usual RFC 5322 local-part specials and an
    /// alphanumeric/dot/hyphen domain.
    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || domain.is_empty() {
            return false;
        }

        if !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIAL_CHARS.contains(&c))
        {
            return false;
        }

        domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Email").field(&self.0).finish()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = InvalidAccountState;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
