//! Models for the login-link token flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a sent login token.
///
/// One row per recipient email; requesting a new link for the same address
/// replaces the stored token rather than adding a second row.
pub struct LoginToken {
    pub login_token_id: i64,
    /// Email address the login link was sent to.
    pub target_email_address: String,
    /// Opaque token embedded in the login link.
    pub generated_token: String,
    /// Issuance timestamp; the freshness window is measured from here.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for requesting a login link.
pub struct RequestLoginPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
/// Query parameters carried by the emailed login link.
pub struct LoginQuery {
    pub login_token: String,
}
