//! Username Value Object

use crate::domain::InvalidAccountState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum username length (in characters)
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length (in characters)
pub const USERNAME_MAX_LENGTH: usize = 50;

/// Validated username.
///
/// # Invariants
/// - Not blank
/// - Length between 3 and 50 characters
///
/// Stored and compared exactly as entered.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new username with validation.
    pub fn new(input: impl Into<String>) -> Result<Self, InvalidAccountState> {
        let username = input.into();

        if username.trim().is_empty() {
            return Err(InvalidAccountState("Username cannot be blank."));
        }

        let length = username.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
            return Err(InvalidAccountState(
                "Username must be between 3 and 50 characters.",
            ));
        }

        Ok(Self(username))
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

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Username").field(&self.0).finish()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = InvalidAccountState;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        let name = Username::new("alice").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_case_preserved() {
        let name = Username::new("Alice").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_blank_rejected() {
        assert!(Username::new("").is_err());
        assert!(Username::new("   ").is_err());
    }

    #[test]
    fn test_length_boundaries() {
        // 2 and 51 reject; 3 and 50 accept
        assert!(Username::new("ab").is_err());
        assert!(Username::new("abc").is_ok());
        assert!(Username::new("a".repeat(50)).is_ok());
        assert!(Username::new("a".repeat(51)).is_err());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // Three multibyte characters are still three characters
        assert!(Username::new("あいう").is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = Username::new("alice").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"alice\"");
        let back: Username = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<Username, _> = serde_json::from_str("\"ab\"");
        assert!(result.is_err());
    }
}
