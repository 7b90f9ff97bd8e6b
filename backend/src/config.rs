use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;

/// Fixed test login pair used to bypass token validation during development.
///
/// Only ever populated outside production mode; `Config::load` discards the
/// pair otherwise, so a production process cannot carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogin {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Public base URL used to build login links, e.g. `https://phylomedb.org`.
    pub base_url: String,
    pub smtp: SmtpConfig,
    /// Freshness window for login tokens, measured from issuance.
    pub login_token_ttl_minutes: i64,
    /// Client-side lifetime of the session cookie.
    pub session_cookie_hours: u64,
    pub cookie_secure: bool,
    pub cors_allow_origins: Vec<String>,
    pub production_mode: bool,
    pub test_login: Option<TestLogin>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production_mode = match app_env.as_str() {
            "production" => true,
            "development" | "test" => false,
            other => return Err(anyhow!("Invalid APP_ENV value: {}", other)),
        };

        // Development reads .env.development first so a local override file
        // can shadow the shared .env.
        if !production_mode {
            dotenvy::from_filename(".env.development").ok();
        }
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/phylomedb".to_string());

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("EMAIL_USER").unwrap_or_default(),
            password: env::var("EMAIL_PASS").unwrap_or_default(),
            from_address: env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@phylomedb.org".to_string()),
        };

        let login_token_ttl_minutes = env::var("LOGIN_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);

        let session_cookie_hours = env::var("SESSION_COOKIE_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v == "true")
            .unwrap_or(production_mode);

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let test_pair = match (env::var("TEST_USER_EMAIL"), env::var("TEST_USER_TOKEN")) {
            (Ok(email), Ok(token)) => Some(TestLogin { email, token }),
            _ => None,
        };
        let test_login = if production_mode {
            if test_pair.is_some() {
                tracing::warn!("TEST_USER_EMAIL/TEST_USER_TOKEN are ignored in production mode");
            }
            None
        } else {
            test_pair
        };

        Ok(Config {
            database_url,
            base_url,
            smtp,
            login_token_ttl_minutes,
            session_cookie_hours,
            cookie_secure,
            cors_allow_origins,
            production_mode,
            test_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("lock env")
    }

    fn clear_auth_env() {
        for key in [
            "APP_ENV",
            "TEST_USER_EMAIL",
            "TEST_USER_TOKEN",
            "LOGIN_TOKEN_TTL_MINUTES",
            "COOKIE_SECURE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_defaults_to_development_with_fifteen_minute_window() {
        let _guard = env_guard();
        clear_auth_env();

        let config = Config::load().expect("load config");

        assert!(!config.production_mode);
        assert_eq!(config.login_token_ttl_minutes, 15);
        assert_eq!(config.session_cookie_hours, 24);
    }

    #[test]
    fn load_keeps_test_login_in_development() {
        let _guard = env_guard();
        clear_auth_env();
        env::set_var("APP_ENV", "development");
        env::set_var("TEST_USER_EMAIL", "test@gmail.com");
        env::set_var("TEST_USER_TOKEN", "fixed-test-token");

        let config = Config::load().expect("load config");
        let test_login = config.test_login.expect("test login present");

        assert_eq!(test_login.email, "test@gmail.com");
        assert_eq!(test_login.token, "fixed-test-token");
        clear_auth_env();
    }

    #[test]
    fn load_discards_test_login_in_production() {
        let _guard = env_guard();
        clear_auth_env();
        env::set_var("APP_ENV", "production");
        env::set_var("TEST_USER_EMAIL", "test@gmail.com");
        env::set_var("TEST_USER_TOKEN", "fixed-test-token");

        let config = Config::load().expect("load config");

        assert!(config.production_mode);
        assert!(config.test_login.is_none());
        assert!(config.cookie_secure);
        clear_auth_env();
    }

    #[test]
    fn load_rejects_unknown_app_env() {
        let _guard = env_guard();
        clear_auth_env();
        env::set_var("APP_ENV", "staging");

        assert!(Config::load().is_err());
        clear_auth_env();
    }
}
