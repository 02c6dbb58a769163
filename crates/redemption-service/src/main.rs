//! Coupon Redemption Service
//!
//! REST API for browsing coupons, redeeming them and reading history

use anyhow::{Context, Result};
use coupon_common::default_catalog;
use redemption_service::{create_router, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redemption_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Coupon Redemption Service");
    info!("Store backend: {:?}", config.backend);

    let store = config.open_store().await?;
    let notifications = config.notification_sink()?;

    let state = AppState::new(store, default_catalog(), notifications);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.address()))?;

    info!("Coupon Redemption Service running on http://{}", config.address());

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
