//! Login token store.
//!
//! Persists the single live login token per recipient email. Issuing a new
//! token for an address that already holds one replaces it in place, which
//! is what invalidates earlier login links.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::connection::DbPool;
use crate::models::login_token::LoginToken;

const SELECT_COLUMNS: &str =
    "login_token_id, target_email_address, generated_token, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginTokenStore: Send + Sync {
    /// Mints a fresh opaque token for `email` and upserts it by the email
    /// key. The returned record carries the stored token value.
    async fn issue(&self, email: &str) -> Result<LoginToken, sqlx::Error>;

    /// Looks a token up by its value. Absence is `None`, not an error.
    async fn find_by_token(&self, token: &str) -> Result<Option<LoginToken>, sqlx::Error>;

    /// Deletes tokens issued before `issued_before`. Maintenance only;
    /// the auth flow itself never deletes tokens.
    async fn delete_stale(&self, issued_before: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgLoginTokenStore {
    pool: DbPool,
}

impl PgLoginTokenStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginTokenStore for PgLoginTokenStore {
    async fn issue(&self, email: &str) -> Result<LoginToken, sqlx::Error> {
        let token = Uuid::new_v4().to_string();

        let query = format!(
            "INSERT INTO sent_login_tokens (target_email_address, generated_token) \
             VALUES ($1, $2) \
             ON CONFLICT (target_email_address) \
             DO UPDATE SET generated_token = EXCLUDED.generated_token, created_at = NOW() \
             RETURNING {}",
            SELECT_COLUMNS
        );
        sqlx::query_as::<_, LoginToken>(&query)
            .bind(email)
            .bind(&token)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<LoginToken>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM sent_login_tokens WHERE generated_token = $1",
            SELECT_COLUMNS
        );
        sqlx::query_as::<_, LoginToken>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_stale(&self, issued_before: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sent_login_tokens WHERE created_at < $1")
            .bind(issued_before)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
