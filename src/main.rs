use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use folio_api::{
    analytics,
    auth::TokenSigner,
    config,
    database::DatabaseManager,
    mailer,
    middleware::ResetRateLimiter,
    routes,
    services::{PgProfileService, PgThemeService, PgUserService},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Folio API in {:?} mode", config.environment);

    config.validate()?;

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let signer = TokenSigner::from_config(&config.security);
    let analytics = analytics::from_config(&config.analytics).context("failed to build analytics client")?;
    if analytics.is_none() {
        tracing::info!("Analytics disabled (no ANALYTICS_WRITE_KEY)");
    }

    let state = AppState {
        users: Arc::new(PgUserService::new(
            pool.clone(),
            signer.clone(),
            mailer::from_config(&config.mail).context("failed to build mailer")?,
            config.password_reset.clone(),
            &config.mail,
        )),
        profiles: Arc::new(PgProfileService::new(pool.clone())),
        themes: Arc::new(PgThemeService::new(pool.clone())),
        analytics,
        signer,
        reset_limiter: Arc::new(ResetRateLimiter::from_config(&config.rate_limit)?),
        pool: Some(pool),
    };

    let app = routes::app(state, &config.security);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Folio API listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
