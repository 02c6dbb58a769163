//! Coupon Redemption Service
//!
//! Serves a fixed catalog of favor coupons, redeems them against per-coupon
//! claim counters and keeps a redemption history. All state lives in three
//! JSON documents behind a pluggable [`store::DocumentStore`].
//!
//! ## Endpoints
//!
//! - `GET /api/coupons` - Active coupons with current claim counts
//! - `GET /api/history` - Redemption history, newest first
//! - `POST /api/redeem` - Redeem one claim of a coupon
//! - `GET /health` - Health check

pub mod admin;
pub mod config;
pub mod handlers;
pub mod notifier;
pub mod redemption;
pub mod repositories;
pub mod store;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, StoreBackend};
pub use handlers::AppState;
pub use notifier::{NotificationSink, Notifier, TelegramNotifier};
pub use redemption::{RedemptionError, RedemptionReceipt, RedemptionService};
pub use repositories::{CatalogRepository, ClaimsRepository, HistoryRepository};
pub use store::{BlobStore, DocumentStore, MemoryStore, RedisStore, SharedStore, StoreError};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/coupons", get(handlers::list_coupons_handler))
        .route("/api/history", get(handlers::list_history_handler))
        .route("/api/redeem", post(handlers::redeem_handler))
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
