//! Session store.
//!
//! Persists the single live session per email. Re-login upserts by the
//! email key, so the previous session token stops resolving; logout deletes
//! the row. Rows never expire server-side.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::connection::DbPool;
use crate::models::session::Session;

const SELECT_COLUMNS: &str = "session_id, user_email_address, session_token, created_at";

/// Result of a revocation attempt. `revoked == false` means no matching row
/// existed, which callers report as an unauthorized condition, not a crash.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RevokeOutcome {
    pub revoked: bool,
    pub count: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mints a fresh session token for `email` and upserts it by the email
    /// key, superseding any session the email already held.
    async fn issue(&self, email: &str) -> Result<Session, sqlx::Error>;

    async fn find_by_token(&self, session_token: &str) -> Result<Option<Session>, sqlx::Error>;

    async fn revoke(&self, session_token: &str) -> Result<RevokeOutcome, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn issue(&self, email: &str) -> Result<Session, sqlx::Error> {
        let token = Uuid::new_v4().to_string();

        let query = format!(
            "INSERT INTO login_sessions (user_email_address, session_token) \
             VALUES ($1, $2) \
             ON CONFLICT (user_email_address) \
             DO UPDATE SET session_token = EXCLUDED.session_token, created_at = NOW() \
             RETURNING {}",
            SELECT_COLUMNS
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(email)
            .bind(&token)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_by_token(&self, session_token: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM login_sessions WHERE session_token = $1",
            SELECT_COLUMNS
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn revoke(&self, session_token: &str) -> Result<RevokeOutcome, sqlx::Error> {
        let result = sqlx::query("DELETE FROM login_sessions WHERE session_token = $1")
            .bind(session_token)
            .execute(&self.pool)
            .await?;
        let count = result.rows_affected();
        Ok(RevokeOutcome {
            revoked: count > 0,
            count,
        })
    }
}
