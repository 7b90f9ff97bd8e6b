//! Models for active login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of an active session.
///
/// One row per email; logging in again replaces the stored session token,
/// so a second device silently signs out the first. Sessions carry no
/// server-side expiry; only the cookie lifetime bounds them.
pub struct Session {
    pub session_id: i64,
    /// Email address the session belongs to.
    pub user_email_address: String,
    /// Opaque token presented by the session cookie.
    pub session_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Identity summary returned to the client.
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub admin: bool,
}

impl MeResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            email: None,
            admin: false,
        }
    }
}
