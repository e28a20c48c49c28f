use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Totally ordered by privilege.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum Role {
    #[default]
    User = 0,
    Admin = 1,
    SuperAdmin = 2,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Wire form, used as the token role claim and in API payloads.
    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            User => "USER",
            Admin => "ADMIN",
            SuperAdmin => "SUPER_ADMIN",
        }
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        use Role::*;
        matches!(self, Admin | SuperAdmin)
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use Role::*;
        match id {
            0 => Some(User),
            1 => Some(Admin),
            2 => Some(SuperAdmin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use Role::*;
        match code {
            "USER" => Some(User),
            "ADMIN" => Some(Admin),
            "SUPER_ADMIN" => Some(SuperAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_id() {
        assert_eq!(Role::from_id(0), Some(Role::User));
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::SuperAdmin));
        assert_eq!(Role::from_id(99), None);
    }

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("USER"), Some(Role::User));
        assert_eq!(Role::from_code("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_code("SUPER_ADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::from_code("user"), None);
        assert_eq!(Role::from_code(""), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::SuperAdmin.to_string(), "SUPER_ADMIN");
    }

    #[test]
    fn test_role_checks() {
        assert!(!Role::User.is_admin_or_higher());
        assert!(Role::Admin.is_admin_or_higher());
        assert!(Role::SuperAdmin.is_admin_or_higher());
        assert!(!Role::User.is_super_admin());
        assert!(!Role::Admin.is_super_admin());
        assert!(Role::SuperAdmin.is_super_admin());
    }

    #[test]
    fn test_role_privilege_ordering() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn test_role_serde_codes() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
