//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::account::Account;
use crate::domain::page::{Page, PageRequest, UserFilter};
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::AuthResult;

/// Account store port.
///
/// Writes are single-document upserts and single deletes, atomic at the
/// document boundary. Username and email are unique lookup keys.
#[trait_variant::make(UserStore: Send)]
pub trait LocalUserStore {
    /// Insert or replace the account record.
    async fn save(&self, account: &Account) -> AuthResult<()>;

    /// Find by ID.
    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find by username (exact match).
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>>;

    /// Find by email (exact match, case-sensitive as stored).
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>>;

    /// Filtered, paginated scan.
    async fn find_page(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AuthResult<Page<Account>>;

    /// Count accounts holding the given role.
    async fn count_by_role(&self, role: Role) -> AuthResult<u64>;

    /// Delete by ID. Returns whether a record was removed.
    async fn delete_by_id(&self, id: &AccountId) -> AuthResult<bool>;
}

/// Revoked-token store port.
///
/// Entries live no longer than the token they block. Revocation is
/// idempotent, and a token that is already past its expiry still gets a
/// short-lived entry so racing requests observe the revocation.
#[trait_variant::make(TokenDenylist: Send)]
pub trait LocalTokenDenylist {
    /// Record the token as revoked until its declared expiry.
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AuthResult<()>;

    /// Whether the token has been revoked.
    async fn is_revoked(&self, token: &str) -> AuthResult<bool>;
}
