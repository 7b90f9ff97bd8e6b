use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::services::auth::LoginLinkSender;

/// SMTP-backed implementation of the login-link delivery capability.
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self> {
        let smtp = &config.smtp;

        let mailer = if smtp.username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .port(smtp.port)
                .build()
        } else {
            let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
                .port(smtp.port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address: smtp.from_address.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

pub fn build_login_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/login?login_token={}",
        base_url.trim_end_matches('/'),
        token
    )
}

fn login_email_body(login_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<body>
    <h2>Welcome to PhylomeDB6!</h2>
    <p>Please click the link below to log in:</p>
    <a href="{}">Login to PhylomeDB6</a>
    <p><u>The link is valid for 15 minutes only.</u></p>
    <p>If you did not request this email, please ignore it.</p>
    <footer>
        <p>Best regards,</p>
        <p>The PhylomeDB6 Team</p>
    </footer>
</body>
</html>
"#,
        login_link
    )
}

#[async_trait]
impl LoginLinkSender for EmailService {
    async fn send_login_link(&self, email: &str, token: &str) -> Result<()> {
        let login_link = build_login_link(&self.base_url, token);

        let message = Message::builder()
            .from(self.from_address.parse()?)
            .to(email.parse()?)
            .subject("Welcome to PhylomeDB6")
            .header(ContentType::TEXT_HTML)
            .body(login_email_body(&login_link))?;

        self.mailer.send(message).await?;
        Ok(())
    }
}
