//! Login-link authentication flow.
//!
//! Orchestrates the token and session stores: a client requests a login
//! link, follows it within the freshness window, and receives a session
//! cookie. Both stores are owned exclusively by this service; handlers and
//! middleware never touch them directly.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, TestLogin};
use crate::models::admin_user::AdminUser;
use crate::models::session::Session;
use crate::repositories::admin_user::AdminDirectory;
use crate::repositories::login_token::LoginTokenStore;
use crate::repositories::session::{RevokeOutcome, SessionStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login token not found")]
    TokenNotFound,
    #[error("login token past its freshness window")]
    TokenExpired,
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
    #[error("login link delivery failed")]
    Delivery(#[source] anyhow::Error),
}

/// Delivery capability injected into the flow. The service only needs
/// "send this token to this email"; transport lives elsewhere.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginLinkSender: Send + Sync {
    async fn send_login_link(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

pub struct AuthService {
    tokens: Arc<dyn LoginTokenStore>,
    sessions: Arc<dyn SessionStore>,
    admins: Arc<dyn AdminDirectory>,
    sender: Arc<dyn LoginLinkSender>,
    token_ttl: Duration,
    test_login: Option<TestLogin>,
}

impl AuthService {
    pub fn new(
        tokens: Arc<dyn LoginTokenStore>,
        sessions: Arc<dyn SessionStore>,
        admins: Arc<dyn AdminDirectory>,
        sender: Arc<dyn LoginLinkSender>,
        config: &Config,
    ) -> Self {
        Self {
            tokens,
            sessions,
            admins,
            sender,
            token_ttl: Duration::minutes(config.login_token_ttl_minutes),
            test_login: config.test_login.clone(),
        }
    }

    /// Issues a login token for `email` and hands it to the delivery
    /// capability. A delivery failure is reported to the caller, but the
    /// freshly issued token stays valid; the user can simply request a new
    /// link, which supersedes this one anyway.
    pub async fn request_login(&self, email: &str) -> Result<(), AuthError> {
        let token = self.tokens.issue(email).await?;
        tracing::info!(email, "login token issued");

        self.sender
            .send_login_link(email, &token.generated_token)
            .await
            .map_err(|e| {
                tracing::error!(email, "login link delivery failed: {:?}", e);
                AuthError::Delivery(e)
            })
    }

    /// Exchanges a login token for a session.
    ///
    /// The token is checked against the freshness window but not consumed:
    /// within the window it can be exchanged again, each exchange minting a
    /// session that supersedes the previous one for that email.
    pub async fn validate(&self, token: &str) -> Result<Session, AuthError> {
        if let Some(test) = &self.test_login {
            if token == test.token {
                tracing::warn!(email = %test.email, "test login token accepted");
                return Ok(self.sessions.issue(&test.email).await?);
            }
        }

        let login = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if Utc::now() - login.created_at > self.token_ttl {
            return Err(AuthError::TokenExpired);
        }

        let session = self.sessions.issue(&login.target_email_address).await?;
        tracing::info!(email = %session.user_email_address, "session created");
        Ok(session)
    }

    /// Resolves a session token to its session. An unknown token is simply
    /// anonymous, never an error.
    pub async fn identify(&self, session_token: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.find_by_token(session_token).await?)
    }

    /// Resolves a session token to an administrator record. A missing
    /// session short-circuits without consulting the directory at all.
    pub async fn check_admin(&self, session_token: &str) -> Result<Option<AdminUser>, AuthError> {
        let session = match self.sessions.find_by_token(session_token).await? {
            Some(session) => session,
            None => return Ok(None),
        };
        Ok(self
            .admins
            .find_by_email(&session.user_email_address)
            .await?)
    }

    pub async fn logout(&self, session_token: &str) -> Result<RevokeOutcome, AuthError> {
        let outcome = self.sessions.revoke(session_token).await?;
        if outcome.revoked {
            tracing::info!("session revoked");
        }
        Ok(outcome)
    }
}
