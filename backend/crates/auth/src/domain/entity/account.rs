//! Account Aggregate
//!
//! Immutable account value. Every transition returns a fresh `Account`;
//! the old instance is discarded by the caller. All state invariants are
//! enforced here:
//!
//! - `failed_login_attempts >= max` implies `locked`
//! - SUPER_ADMIN is terminal: no demotion path
//! - a locked account cannot be promoted
//! - changing the email clears `email_verified`
//! - unlocking resets the failed-login counter
//! - `updated_at` strictly increases on every transition

use chrono::{DateTime, TimeDelta, Utc};
use platform::password::HashedPassword;

use crate::domain::InvalidAccountState;
use crate::domain::value_object::{account_id::AccountId, email::Email, role::Role, username::Username};

/// Failed logins after which an account locks (default; configurable).
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// A user account with credential, role, and state.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    username: Username,
    email: Email,
    password_hash: HashedPassword,
    role: Role,
    locked: bool,
    email_verified: bool,
    failed_login_attempts: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account.
    ///
    /// New accounts start unlocked, unverified, with a zero failure count.
    pub fn create(
        username: Username,
        email: Email,
        password_hash: HashedPassword,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            username,
            email,
            password_hash,
            role,
            locked: false,
            email_verified: false,
            failed_login_attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstruct an account from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: AccountId,
        username: Username,
        email: Email,
        password_hash: HashedPassword,
        role: Role,
        locked: bool,
        email_verified: bool,
        failed_login_attempts: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            role,
            locked,
            email_verified,
            failed_login_attempts,
            created_at,
            updated_at,
        }
    }

    // ========================================================================
    // Transitions (copy-on-write)
    // ========================================================================

    /// Change the email address. A changed address needs re-verification.
    pub fn change_email(&self, new_email: Email) -> Account {
        Account {
            email: new_email,
            email_verified: false,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Replace the password hash.
    pub fn change_password(&self, new_hash: HashedPassword) -> Account {
        Account {
            password_hash: new_hash,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Change the role.
    ///
    /// SUPER_ADMIN is terminal, and a locked account cannot be promoted.
    pub fn promote(&self, new_role: Role) -> Result<Account, InvalidAccountState> {
        if self.role.is_super_admin() {
            return Err(InvalidAccountState(
                "SUPER_ADMIN accounts cannot be demoted.",
            ));
        }
        if self.locked {
            return Err(InvalidAccountState("Locked accounts cannot be promoted."));
        }
        Ok(Account {
            role: new_role,
            updated_at: self.bumped(),
            ..self.clone()
        })
    }

    /// Lock the account.
    pub fn lock(&self) -> Account {
        Account {
            locked: true,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Unlock the account. Also resets the failed-login counter.
    pub fn unlock(&self) -> Account {
        Account {
            locked: false,
            failed_login_attempts: 0,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Mark the email address as verified.
    pub fn verify_email(&self) -> Account {
        Account {
            email_verified: true,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Record one failed login attempt, locking at the given threshold.
    pub fn record_failed_login(&self, max_failed_attempts: u32) -> Account {
        let attempts = self.failed_login_attempts + 1;
        Account {
            failed_login_attempts: attempts,
            locked: self.locked || attempts >= max_failed_attempts,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    /// Reset the failed-login counter after a successful login.
    pub fn reset_failed_login(&self) -> Account {
        Account {
            failed_login_attempts: 0,
            updated_at: self.bumped(),
            ..self.clone()
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn failed_login_attempts(&self) -> u32 {
        self.failed_login_attempts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Next `updated_at` value, strictly greater than the current one even
    /// when the wall clock has not advanced past it.
    fn bumped(&self) -> DateTime<Utc> {
        let now = Utc::now();
        if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::microseconds(1)
        }
    }
}

impl PartialEq for Account {
    /// Identity equality, like any aggregate root.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}
