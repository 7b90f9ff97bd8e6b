//! Administrator directory.
//!
//! Read-only lookup of which emails hold administrative privilege. Rows are
//! maintained elsewhere; the auth flow only ever queries by email.

use async_trait::async_trait;

use crate::db::connection::DbPool;
use crate::models::admin_user::AdminUser;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgAdminDirectory {
    pool: DbPool,
}

impl PgAdminDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminDirectory for PgAdminDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, sqlx::Error> {
        sqlx::query_as::<_, AdminUser>(
            "SELECT user_id, admin_email, admin_fullname FROM admin_users WHERE admin_email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
