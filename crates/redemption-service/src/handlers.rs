//! API request handlers for the coupon service

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coupon_common::{
    project_coupons, project_history, CouponDefinition, CouponView, HistoryViewItem, RedeemRequest,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    notifier::NotificationSink,
    redemption::{RedemptionError, RedemptionService},
    repositories::{CatalogRepository, ClaimsRepository, HistoryRepository},
    store::SharedStore,
};

/// Shared application state
pub struct AppState {
    pub catalog: CatalogRepository,
    pub claims: ClaimsRepository,
    pub history: HistoryRepository,
    pub redemption: RedemptionService,
}

impl AppState {
    /// Wire repositories and the redemption service over one store
    pub fn new(
        store: SharedStore,
        fallback_catalog: Vec<CouponDefinition>,
        notifications: NotificationSink,
    ) -> Self {
        let catalog = CatalogRepository::new(store.clone(), fallback_catalog);
        let claims = ClaimsRepository::new(store.clone());
        let history = HistoryRepository::new(store);
        let redemption = RedemptionService::new(history.clone(), claims.clone(), notifications);

        Self {
            catalog,
            claims,
            history,
            redemption,
        }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<RedemptionError> for ApiError {
    fn from(err: RedemptionError) -> Self {
        match err {
            RedemptionError::Validation(e) => ApiError::bad_request(e.to_string()),
            other => {
                error!("Error redeeming coupon: {}", other);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to redeem coupon".to_string(),
                }
            }
        }
    }
}

/// Response from a redemption
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub success: bool,
    pub message: String,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "redemption-service"
    }))
}

/// Active coupons with their claim counters. Always 200: an unreadable
/// catalog falls back to the built-in one, unreadable counters read as zero.
pub async fn list_coupons_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CouponView>> {
    let definitions = state.catalog.list_active().await;

    let claims = match state.claims.get_all().await {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Failed to read claim counters, reporting zero claims: {}", e);
            Default::default()
        }
    };

    Json(project_coupons(&definitions, &claims))
}

/// Redemption history, newest first. Always 200, empty on store failure.
pub async fn list_history_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<HistoryViewItem>> {
    match state.history.get_all().await {
        Ok(records) => Json(project_history(records)),
        Err(e) => {
            warn!("Failed to read request history: {}", e);
            Json(Vec::new())
        }
    }
}

/// Redeem one claim of a coupon
pub async fn redeem_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    info!("Redeeming coupon: {:?}", request.coupon_id);

    let receipt = state.redemption.redeem(request).await?;

    Ok(Json(RedeemResponse {
        success: true,
        message: receipt.message,
    }))
}
