use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceExt;

use phylomedb_backend::{
    handlers, middleware as auth_middleware, services::auth::AuthService, state::AppState,
};

mod support;

use support::{
    build_auth_service, seed_admin, test_config, test_pool, unique_email, RecordingSender,
};

fn test_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::request_login))
        .route("/login", get(handlers::auth::validate_login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", get(handlers::auth::logout));
    let admin_routes = Router::new()
        .route("/api/admin/me", get(handlers::auth::admin_me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth::auth_admin,
        ));
    public_routes.merge(admin_routes).with_state(state)
}

async fn test_app() -> (Router, Arc<AuthService>, Arc<RecordingSender>) {
    let pool = test_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    let sender = RecordingSender::new();
    let auth = Arc::new(build_auth_service(&pool, sender.clone(), &test_config()));
    let state = AppState::new(auth.clone(), test_config());
    (test_router(state), auth, sender)
}

async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn cookie_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={}", cookie))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn request_login_sends_link_and_reports_success() {
    let (app, _auth, sender) = test_app().await;
    let email = unique_email("api_request");

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"email":"{}"}}"#, email)))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    let message = json["message"].as_str().expect("message");
    assert!(message.contains(&email));
    assert!(sender.last_token_for(&email).is_some());
}

#[tokio::test]
async fn request_login_rejects_invalid_email() {
    let (app, _auth, sender) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"not-an-email"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(sender.sent_count(), 0);
}

#[tokio::test]
async fn login_link_sets_cookie_and_redirects_home() {
    let (app, auth, sender) = test_app().await;
    let email = unique_email("api_login");

    auth.request_login(&email).await.expect("request login");
    let token = sender.last_token_for(&email).expect("token delivered");

    let request = Request::builder()
        .uri(format!("/login?login_token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie set");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn login_with_unknown_token_is_unauthorized() {
    let (app, _auth, _sender) = test_app().await;

    let request = Request::builder()
        .uri("/login?login_token=never-issued")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Login data not found");
}

#[tokio::test]
async fn me_without_cookie_is_anonymous() {
    let (app, _auth, _sender) = test_app().await;

    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["authenticated"], false);
    assert_eq!(json["admin"], false);
}

#[tokio::test]
async fn me_reports_identity_and_admin_flag() {
    let (app, auth, sender) = test_app().await;
    let pool = test_pool().await;
    let email = unique_email("api_me_admin");
    seed_admin(&pool, &email, "Curator").await;

    auth.request_login(&email).await.expect("request login");
    let token = sender.last_token_for(&email).expect("token delivered");
    let session = auth.validate(&token).await.expect("validate");

    let response = app
        .oneshot(cookie_request("/api/auth/me", &session.session_token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["email"], email.as_str());
    assert_eq!(json["admin"], true);
}

#[tokio::test]
async fn logout_without_cookie_is_unauthorized() {
    let (app, _auth, _sender) = test_app().await;

    let request = Request::builder()
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Missing authentication cookies.");
}

#[tokio::test]
async fn logout_revokes_session_and_clears_cookie() {
    let (app, auth, sender) = test_app().await;
    let email = unique_email("api_logout");

    auth.request_login(&email).await.expect("request login");
    let token = sender.last_token_for(&email).expect("token delivered");
    let session = auth.validate(&token).await.expect("validate");

    let response = app
        .clone()
        .oneshot(cookie_request("/api/auth/logout", &session.session_token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("clear cookie set");
    assert!(cookie.contains("Max-Age=0"));
    let json = response_json(response).await;
    assert_eq!(json["revoked"], true);
    assert_eq!(json["count"], 1);

    // The session is gone; a repeat logout reports that, not a crash.
    let response = app
        .oneshot(cookie_request("/api/auth/logout", &session.session_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["revoked"], false);
    assert_eq!(json["error"], "Your session is no longer active.");
}

#[tokio::test]
async fn admin_route_gates_on_session_and_directory() {
    let (app, auth, sender) = test_app().await;
    let pool = test_pool().await;

    // No cookie at all.
    let request = Request::builder()
        .uri("/api/admin/me")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Live session, but not in the directory.
    let user_email = unique_email("api_plain");
    auth.request_login(&user_email).await.expect("request");
    let token = sender.last_token_for(&user_email).expect("token");
    let user_session = auth.validate(&token).await.expect("validate");
    let response = app
        .clone()
        .oneshot(cookie_request("/api/admin/me", &user_session.session_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Live session with a directory entry.
    let admin_email = unique_email("api_admin");
    seed_admin(&pool, &admin_email, "Head Curator").await;
    auth.request_login(&admin_email).await.expect("request");
    let token = sender.last_token_for(&admin_email).expect("token");
    let admin_session = auth.validate(&token).await.expect("validate");
    let response = app
        .oneshot(cookie_request("/api/admin/me", &admin_session.session_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["admin_email"], admin_email.as_str());
    assert_eq!(json["admin_fullname"], "Head Curator");
}
