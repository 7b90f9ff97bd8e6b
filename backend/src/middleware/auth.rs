use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    state::AppState,
    utils::cookies::{extract_cookie_value, SESSION_COOKIE_NAME},
};

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, SESSION_COOKIE_NAME))
}

// Session + admin-directory gate for admin-only routes. A missing or stale
// session is 401; a live session outside the directory is 403.
pub async fn auth_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = cookie_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let session = state
        .auth
        .identify(&token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let admin = state
        .auth
        .check_admin(&token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::FORBIDDEN)?;

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}
