//! Redemption transaction
//!
//! Redeeming a coupon appends a [`HistoryRecord`] and bumps the coupon's
//! [`ClaimsState`]. Both documents are read, changed in memory and written
//! back whole, history first and claims second:
//!
//! - a failure writing history leaves both documents untouched;
//! - a failure writing claims leaves a logged redemption whose counter did
//!   not advance ([`RedemptionError::StateWrite`]).
//!
//! The service does not look at the catalog. Whether `coupon_id` exists, is
//! active, or has claims left is the caller's business.

use chrono::Utc;
use coupon_common::{ClaimsState, HistoryRecord, RedeemRequest, Redemption};
use thiserror::Error;
use tracing::{error, info};

use crate::notifier::{redemption_summary, NotificationSink};
use crate::repositories::{ClaimsRepository, HistoryRepository};
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum RedemptionError {
    #[error(transparent)]
    Validation(#[from] coupon_common::Error),

    #[error("Failed to read current redemption state: {0}")]
    Read(#[source] StoreError),

    #[error("Failed to write redemption history: {0}")]
    HistoryWrite(#[source] StoreError),

    #[error("Redemption was logged but the claim counter was not updated: {0}")]
    StateWrite(#[source] StoreError),
}

/// What a successful redemption committed
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub record: HistoryRecord,
    pub claims: ClaimsState,
    pub message: String,
}

#[derive(Clone)]
pub struct RedemptionService {
    history: HistoryRepository,
    claims: ClaimsRepository,
    notifications: NotificationSink,
}

impl RedemptionService {
    pub fn new(
        history: HistoryRepository,
        claims: ClaimsRepository,
        notifications: NotificationSink,
    ) -> Self {
        Self {
            history,
            claims,
            notifications,
        }
    }

    /// Validate a loose request, then redeem it. Nothing is read or written
    /// when validation fails.
    pub async fn redeem(&self, request: RedeemRequest) -> Result<RedemptionReceipt, RedemptionError> {
        let redemption = request.validate()?;
        self.redeem_validated(redemption).await
    }

    pub async fn redeem_validated(
        &self,
        redemption: Redemption,
    ) -> Result<RedemptionReceipt, RedemptionError> {
        let (mut history, mut states) = tokio::try_join!(self.history.load(), self.claims.load())
            .map_err(RedemptionError::Read)?;

        let now = Utc::now();
        let record = HistoryRecord::new(&redemption, &history, now);
        history.push(record.clone());
        let claims = ClaimsState::apply_claim(&mut states, redemption.coupon_id, now);

        self.history
            .save(&history)
            .await
            .map_err(RedemptionError::HistoryWrite)?;

        if let Err(e) = self.claims.save(&states).await {
            error!(
                "History record {} written but claims for coupon {} were not: {}",
                record.id, redemption.coupon_id, e
            );
            return Err(RedemptionError::StateWrite(e));
        }

        info!(
            "Redeemed coupon {} ({}), claims now {}",
            redemption.coupon_id, redemption.title, claims.current_claims
        );

        self.notifications
            .notify(redemption_summary(&record, &claims));

        Ok(RedemptionReceipt {
            record,
            claims,
            message: "Coupon redeemed successfully".to_string(),
        })
    }
}
