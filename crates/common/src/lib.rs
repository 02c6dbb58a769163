//! Shared data model for the favor-coupon redemption system.
//!
//! Holds the persisted document shapes, the read-side projections served to
//! the UI, and the embedded default catalog. Nothing in here performs I/O.

pub mod catalog;
pub mod error;
pub mod models;
pub mod projection;

pub use catalog::default_catalog;
pub use error::{Error, Result};
pub use models::{
    ClaimsState, CouponDefinition, CouponView, HistoryId, HistoryRecord, HistoryViewItem,
    RedeemRequest, Redemption,
};
pub use projection::{index_claims, project_coupons, project_history};
