//! List Users Use Case
//!
//! Filtered, paginated admin listing. Raw query values are clamped here so
//! the store only ever sees sane page bounds.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::page::{Page, PageRequest, UserFilter};
use crate::domain::repository::UserStore;
use crate::error::AuthResult;

pub struct ListUsersUseCase<S>
where
    S: UserStore,
{
    store: Arc<S>,
}

impl<S> ListUsersUseCase<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        filter: UserFilter,
        page: i64,
        size: i64,
        sort_by: Option<&str>,
        direction: Option<&str>,
    ) -> AuthResult<Page<Account>> {
        let request = PageRequest::clamped(page, size, sort_by, direction);
        self.store.find_page(&filter, &request).await
    }
}
