//! Offline maintenance: removes login tokens past their freshness window.
//!
//! Sessions are left alone on purpose; only the cookie lifetime bounds
//! them, and revocation happens through logout.

use chrono::{Duration, Utc};

use phylomedb_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::login_token::{LoginTokenStore, PgLoginTokenStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url).await?;

    let cutoff = Utc::now() - Duration::minutes(config.login_token_ttl_minutes);
    let store = PgLoginTokenStore::new(pool.clone());
    let deleted = store.delete_stale(cutoff).await?;
    if deleted > 0 {
        tracing::info!("Deleted {} stale login tokens", deleted);
    }

    sqlx::query("VACUUM (ANALYZE) sent_login_tokens")
        .execute(&pool)
        .await?;

    Ok(())
}
