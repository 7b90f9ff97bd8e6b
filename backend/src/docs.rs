#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::models::{
    admin_user::AdminUser,
    login_token::{LoginQuery, RequestLoginPayload},
    session::MeResponse,
};
use crate::repositories::session::RevokeOutcome;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        request_login_doc,
        validate_login_doc,
        me_doc,
        logout_doc,
        admin_me_doc
    ),
    components(schemas(RequestLoginPayload, MeResponse, AdminUser, RevokeOutcome)),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Login-link authentication and sessions"),
        (name = "Admin", description = "Administrator-only endpoints")
    )
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = RequestLoginPayload,
    responses(
        (status = 200, description = "Login link sent"),
        (status = 400, description = "Invalid email address"),
        (status = 500, description = "Delivery or storage failure")
    ),
    tag = "Auth"
)]
fn request_login_doc() {}

#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 303, description = "Session created; cookie set, redirect to /"),
        (status = 401, description = "Unknown or expired login token")
    ),
    tag = "Auth"
)]
fn validate_login_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Identity for the presented cookie", body = MeResponse)),
    tag = "Auth",
    security(("SessionCookie" = []))
)]
fn me_doc() {}

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked; cookie cleared", body = RevokeOutcome),
        (status = 401, description = "No cookie, or session already gone")
    ),
    tag = "Auth",
    security(("SessionCookie" = []))
)]
fn logout_doc() {}

#[utoipa::path(
    get,
    path = "/api/admin/me",
    responses(
        (status = 200, description = "Administrator record of the caller", body = AdminUser),
        (status = 401, description = "No active session"),
        (status = 403, description = "Session holder is not an administrator")
    ),
    tag = "Admin",
    security(("SessionCookie" = []))
)]
fn admin_me_doc() {}
