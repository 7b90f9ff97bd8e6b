use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use phylomedb_backend::{
    config::Config,
    db::connection::create_pool,
    docs, handlers, middleware as auth_middleware,
    repositories::{
        admin_user::PgAdminDirectory, login_token::PgLoginTokenStore, session::PgSessionStore,
    },
    services::auth::AuthService,
    state::AppState,
    utils::email::EmailService,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

fn build_cors_layer(allow_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if allow_origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phylomedb_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        base_url = %config.base_url,
        smtp_host = %config.smtp.host,
        email_pass = %mask_secret(&config.smtp.password),
        login_token_ttl_minutes = config.login_token_ttl_minutes,
        session_cookie_hours = config.session_cookie_hours,
        production_mode = config.production_mode,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Assemble the auth flow from its stores and the mail transport
    let sender = Arc::new(EmailService::new(&config)?);
    let auth = Arc::new(AuthService::new(
        Arc::new(PgLoginTokenStore::new(pool.clone())),
        Arc::new(PgSessionStore::new(pool.clone())),
        Arc::new(PgAdminDirectory::new(pool.clone())),
        sender,
        &config,
    ));
    let state = AppState::new(auth, config.clone());

    // Build public routes (session handling is per-handler)
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::request_login))
        .route("/login", get(handlers::auth::validate_login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", get(handlers::auth::logout));

    // Build admin-protected routes (session + admin directory)
    let admin_routes = Router::new()
        .route("/api/admin/me", get(handlers::auth::admin_me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth::auth_admin,
        ));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&config.cors_allow_origins)),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
