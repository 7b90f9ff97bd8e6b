use std::time::Duration;

/// Name of the session cookie the browser presents on every request.
pub const SESSION_COOKIE_NAME: &str = "token";
pub const SESSION_COOKIE_PATH: &str = "/";

#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
}

pub fn build_session_cookie(value: &str, max_age: Duration, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME,
        value,
        SESSION_COOKIE_PATH,
        max_age.as_secs(),
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_cookie(options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE_NAME, SESSION_COOKIE_PATH,
    );
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}
