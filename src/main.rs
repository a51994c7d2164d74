//! Bakery Storefront - customer-facing gateway for the bakery backend

use anyhow::Result;
use bakery_storefront::config::Config;
use bakery_storefront::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    tracing::info!(backend = %state.backend.base_url(), "using bakery backend");

    let app = router(state);
    let address = config.bind_address();
    tracing::info!("🥐 Bakery storefront listening on {}", address);
    axum::serve(tokio::net::TcpListener::bind(&address).await?, app).await?;
    Ok(())
}
