use axum::{
    extract::{Extension, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use std::time::Duration;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        admin_user::AdminUser,
        login_token::{LoginQuery, RequestLoginPayload},
        session::MeResponse,
    },
    state::AppState,
    utils::cookies::{
        build_clear_cookie, build_session_cookie, extract_cookie_value, CookieOptions,
        SESSION_COOKIE_NAME,
    },
};

fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

fn cookie_options(state: &AppState) -> CookieOptions {
    CookieOptions {
        secure: state.config.cookie_secure,
    }
}

/// `POST /api/auth/login` — request a login link for an email address.
pub async fn request_login(
    State(state): State<AppState>,
    Json(payload): Json<RequestLoginPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    state.auth.request_login(&payload.email).await?;

    Ok(Json(json!({
        "message": format!(
            "Login link has been sent successfully to \"{}\"!",
            payload.email
        )
    })))
}

/// `GET /login?login_token=...` — the link from the email. Exchanges the
/// token for a session, sets the cookie and sends the browser home.
pub async fn validate_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let session = state.auth.validate(&query.login_token).await?;

    let cookie = build_session_cookie(
        &session.session_token,
        Duration::from_secs(state.config.session_cookie_hours * 60 * 60),
        cookie_options(&state),
    );

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// `GET /api/auth/me` — resolve the cookie to an identity. An absent or
/// stale cookie is an anonymous answer, not an error.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let Some(token) = session_cookie_value(&headers) else {
        return Ok(Json(MeResponse::anonymous()));
    };
    let Some(session) = state.auth.identify(&token).await? else {
        return Ok(Json(MeResponse::anonymous()));
    };

    let admin = state.auth.check_admin(&token).await?.is_some();

    Ok(Json(MeResponse {
        authenticated: true,
        email: Some(session.user_email_address),
        admin,
    }))
}

/// `GET /api/auth/logout` — revoke the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(token) = session_cookie_value(&headers) else {
        return Err(AppError::Unauthorized(
            "Missing authentication cookies.".to_string(),
        ));
    };

    let outcome = state.auth.logout(&token).await?;
    let clear = build_clear_cookie(cookie_options(&state));

    let response = if outcome.revoked {
        (
            StatusCode::OK,
            [(header::SET_COOKIE, clear)],
            Json(json!({ "revoked": true, "count": outcome.count })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::SET_COOKIE, clear)],
            Json(json!({
                "revoked": false,
                "count": 0,
                "error": "Your session is no longer active."
            })),
        )
    };

    Ok(response.into_response())
}

/// `GET /api/admin/me` — the caller's directory record; the admin
/// middleware has already resolved it.
pub async fn admin_me(Extension(admin): Extension<AdminUser>) -> Json<AdminUser> {
    Json(admin)
}
