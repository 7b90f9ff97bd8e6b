//! Model for the administrator directory.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// An entry in the administrator directory. Membership is managed by a
/// separate surface; this service only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdminUser {
    pub user_id: i64,
    pub admin_email: String,
    pub admin_fullname: String,
}
