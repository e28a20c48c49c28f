//! In-Memory Store Doubles
//!
//! Process-local implementations of the persistence ports, used by the
//! use-case tests and handy for local experiments. Behavior mirrors the
//! real adapters: exact-match unique lookups, case-insensitive search,
//! TTL semantics on the denylist.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use platform::crypto::sha256_hex;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::page::{Page, PageRequest, SortDirection, SortField, UserFilter};
use crate::domain::repository::{TokenDenylist, UserStore};
use crate::domain::value_object::{account_id::AccountId, role::Role};
use crate::error::AuthResult;

/// In-memory account store
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for InMemoryUserStore {
    async fn save(&self, account: &Account) -> AuthResult<()> {
        self.accounts
            .lock()
            .expect("store mutex poisoned")
            .insert(*account.id().as_uuid(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .expect("store mutex poisoned")
            .get(id.as_uuid())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .expect("store mutex poisoned")
            .values()
            .find(|a| a.username().as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .expect("store mutex poisoned")
            .values()
            .find(|a| a.email().as_str() == email)
            .cloned())
    }

    async fn find_page(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AuthResult<Page<Account>> {
        let accounts = self.accounts.lock().expect("store mutex poisoned");

        let mut matched: Vec<Account> = accounts
            .values()
            .filter(|a| {
                if let Some(search) = &filter.search {
                    let needle = search.to_lowercase();
                    let hit = a.username().as_str().to_lowercase().contains(&needle)
                        || a.email().as_str().to_lowercase().contains(&needle);
                    if !hit {
                        return false;
                    }
                }
                if let Some(role) = filter.role {
                    if a.role() != role {
                        return false;
                    }
                }
                if let Some(locked) = filter.locked {
                    if a.is_locked() != locked {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            let ordering = match page.sort_by {
                SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
                SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
                SortField::Username => a.username().as_str().cmp(b.username().as_str()),
                SortField::Email => a.email().as_str().cmp(b.email().as_str()),
            };
            match page.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matched.len() as u64;
        let content: Vec<Account> = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page::new(content, page.page, page.size, total))
    }

    async fn count_by_role(&self, role: Role) -> AuthResult<u64> {
        Ok(self
            .accounts
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|a| a.role() == role)
            .count() as u64)
    }

    async fn delete_by_id(&self, id: &AccountId) -> AuthResult<bool> {
        Ok(self
            .accounts
            .lock()
            .expect("store mutex poisoned")
            .remove(id.as_uuid())
            .is_some())
    }
}

/// In-memory token denylist with TTL semantics
///
/// Keys are digests, exactly like the Redis adapter; the raw token is
/// never stored.
#[derive(Clone, Default)]
pub struct InMemoryTokenDenylist {
    entries: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryTokenDenylist {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenDenylist for InMemoryTokenDenylist {
    async fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> AuthResult<()> {
        // A token already past its expiry still blocks for one second
        let min_expiry = Utc::now() + chrono::TimeDelta::seconds(1);
        let until = expires_at.max(min_expiry);
        self.entries
            .lock()
            .expect("denylist mutex poisoned")
            .insert(sha256_hex(token.as_bytes()), until);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        let mut entries = self.entries.lock().expect("denylist mutex poisoned");
        let key = sha256_hex(token.as_bytes());
        match entries.get(&key) {
            Some(expiry) if *expiry > Utc::now() => Ok(true),
            Some(_) => {
                entries.remove(&key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{email::Email, username::Username};
    use platform::password::HashedPassword;

    fn account(username: &str, email: &str, role: Role) -> Account {
        Account::create(
            Username::new(username).unwrap(),
            Email::new(email).unwrap(),
            HashedPassword::from_phc_string(
                "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno",
            )
            .unwrap(),
            role,
        )
    }

    #[tokio::test]
    async fn test_save_and_lookups() {
        let store = InMemoryUserStore::new();
        let alice = account("alice", "alice@example.com", Role::User);
        store.save(&alice).await.unwrap();

        assert!(store.find_by_id(alice.id()).await.unwrap().is_some());
        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_username("Alice").await.unwrap().is_none()); // exact
        assert!(
            store
                .find_by_email("alice@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .find_by_email("ALICE@example.com")
                .await
                .unwrap()
                .is_none()
        ); // case-sensitive as stored
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = InMemoryUserStore::new();
        let alice = account("alice", "alice@example.com", Role::User);
        store.save(&alice).await.unwrap();
        store.save(&alice.lock()).await.unwrap();

        assert_eq!(store.len(), 1);
        let loaded = store.find_by_id(alice.id()).await.unwrap().unwrap();
        assert!(loaded.is_locked());
    }

    #[tokio::test]
    async fn test_count_and_delete() {
        let store = InMemoryUserStore::new();
        let alice = account("alice", "alice@example.com", Role::Admin);
        let bob = account("bob", "bob@example.com", Role::User);
        store.save(&alice).await.unwrap();
        store.save(&bob).await.unwrap();

        assert_eq!(store.count_by_role(Role::Admin).await.unwrap(), 1);
        assert_eq!(store.count_by_role(Role::SuperAdmin).await.unwrap(), 0);

        assert!(store.delete_by_id(alice.id()).await.unwrap());
        assert!(!store.delete_by_id(alice.id()).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_page_filter_and_sort() {
        let store = InMemoryUserStore::new();
        store
            .save(&account("alice", "alice@example.com", Role::Admin))
            .await
            .unwrap();
        store
            .save(&account("bob", "bob@example.com", Role::User))
            .await
            .unwrap();
        store
            .save(&account("carol", "carol@example.com", Role::User).lock())
            .await
            .unwrap();

        // Role filter
        let filter = UserFilter {
            role: Some(Role::User),
            ..Default::default()
        };
        let page = store
            .find_page(&filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 2);

        // Locked filter
        let filter = UserFilter {
            locked: Some(true),
            ..Default::default()
        };
        let page = store
            .find_page(&filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].username().as_str(), "carol");

        // Search matches username or email, case-insensitively
        let filter = UserFilter {
            search: Some("ALICE".to_string()),
            ..Default::default()
        };
        let page = store
            .find_page(&filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 1);

        // Username ascending sort
        let request = PageRequest::clamped(0, 2, Some("username"), Some("asc"));
        let page = store
            .find_page(&UserFilter::default(), &request)
            .await
            .unwrap();
        assert_eq!(page.content[0].username().as_str(), "alice");
        assert_eq!(page.content[1].username().as_str(), "bob");
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_denylist_revoke_and_check() {
        let denylist = InMemoryTokenDenylist::new();
        let expiry = Utc::now() + chrono::TimeDelta::hours(1);

        assert!(!denylist.is_revoked("token-a").await.unwrap());
        denylist.revoke("token-a", expiry).await.unwrap();
        assert!(denylist.is_revoked("token-a").await.unwrap());
        assert!(!denylist.is_revoked("token-b").await.unwrap());

        // Idempotent
        denylist.revoke("token-a", expiry).await.unwrap();
        assert!(denylist.is_revoked("token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_denylist_expired_token_still_blocks_briefly() {
        let denylist = InMemoryTokenDenylist::new();
        let past = Utc::now() - chrono::TimeDelta::hours(1);

        denylist.revoke("stale-token", past).await.unwrap();
        // Entry was clamped to a short TTL, not dropped
        assert!(denylist.is_revoked("stale-token").await.unwrap());
    }
}
