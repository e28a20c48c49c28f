//! PostgreSQL Store Implementation

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use platform::password::HashedPassword;

use crate::domain::entity::account::Account;
use crate::domain::page::{Page, PageRequest, SortDirection, SortField, UserFilter};
use crate::domain::repository::UserStore;
use crate::domain::value_object::{
    account_id::AccountId, email::Email, role::Role, username::Username,
};
use crate::error::{AuthError, AuthResult};

const SELECT_COLUMNS: &str = "account_id, username, email, password_hash, role, locked, \
     email_verified, failed_login_attempts, created_at, updated_at";

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE {column} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

impl UserStore for PgUserStore {
    async fn save(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                username,
                email,
                password_hash,
                role,
                locked,
                email_verified,
                failed_login_attempts,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (account_id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                locked = EXCLUDED.locked,
                email_verified = EXCLUDED.email_verified,
                failed_login_attempts = EXCLUDED.failed_login_attempts,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.username().as_str())
        .bind(account.email().as_str())
        .bind(account.password_hash().as_phc_string())
        .bind(account.role().id())
        .bind(account.is_locked())
        .bind(account.is_email_verified())
        .bind(account.failed_login_attempts() as i32)
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a race on the unique username/email indexes
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => Err(
                AuthError::Conflict("Username or email already exists".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE account_id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        self.find_one("email", email).await
    }

    async fn find_page(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AuthResult<Page<Account>> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM accounts");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query.build().fetch_one(&self.pool).await?.get(0);

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM accounts"));
        push_filters(&mut query, filter);

        // Sort column and direction come from a closed enum, never from
        // user input.
        let column = match page.sort_by {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Username => "username",
            SortField::Email => "email",
        };
        let direction = match page.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        query.push(format!(" ORDER BY {column} {direction}"));
        query.push(" LIMIT ");
        query.push_bind(page.size as i64);
        query.push(" OFFSET ");
        query.push_bind(page.offset() as i64);

        let rows: Vec<AccountRow> = query.build_query_as().fetch_all(&self.pool).await?;
        let content = rows
            .into_iter()
            .map(AccountRow::into_account)
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(Page::new(content, page.page, page.size, total as u64))
    }

    async fn count_by_role(&self, role: Role) -> AuthResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = $1")
            .bind(role.id())
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn delete_by_id(&self, id: &AccountId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    let mut prefix = " WHERE ";

    if let Some(search) = &filter.search {
        query.push(prefix);
        query.push("(username ILIKE ");
        query.push_bind(format!("%{search}%"));
        query.push(" OR email ILIKE ");
        query.push_bind(format!("%{search}%"));
        query.push(")");
        prefix = " AND ";
    }
    if let Some(role) = filter.role {
        query.push(prefix);
        query.push("role = ");
        query.push_bind(role.id());
        prefix = " AND ";
    }
    if let Some(locked) = filter.locked {
        query.push(prefix);
        query.push("locked = ");
        query.push_bind(locked);
    }
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: i16,
    locked: bool,
    email_verified: bool,
    failed_login_attempts: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let username = Username::new(self.username)
            .map_err(|e| AuthError::Internal(format!("Corrupt username in store: {e}")))?;
        let email = Email::new(self.email)
            .map_err(|e| AuthError::Internal(format!("Corrupt email in store: {e}")))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Corrupt password hash in store: {e}")))?;
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role id in store: {}", self.role)))?;

        Ok(Account::from_parts(
            AccountId::from_uuid(self.account_id),
            username,
            email,
            password_hash,
            role,
            self.locked,
            self.email_verified,
            self.failed_login_attempts.max(0) as u32,
            self.created_at,
            self.updated_at,
        ))
    }
}
