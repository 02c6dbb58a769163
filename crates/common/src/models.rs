//! Persisted documents, request shapes and UI projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

fn default_active() -> bool {
    true
}

/// Catalog entry stored in `coupons.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDefinition {
    /// Positive id, unique across the catalog
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Symbolic key into the UI's icon lookup
    #[serde(rename = "iconName", alias = "iconTag", default)]
    pub icon_tag: String,

    /// Redemption ceiling
    pub max_claims: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Inactive entries stay in storage but are hidden from the UI
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CouponDefinition {
    /// Check the fields a catalog import must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(Error::validation("id", "coupon id must be positive"));
        }
        if self.title.trim().is_empty() {
            return Err(Error::validation(
                "title",
                format!("coupon {} has an empty title", self.id),
            ));
        }
        if self.max_claims == 0 {
            return Err(Error::validation(
                "maxClaims",
                format!("coupon {} must allow at least one claim", self.id),
            ));
        }
        Ok(())
    }

    /// Validate a whole catalog, including id uniqueness
    pub fn validate_catalog(catalog: &[CouponDefinition]) -> Result<()> {
        let mut seen = HashSet::new();
        for coupon in catalog {
            coupon.validate()?;
            if !seen.insert(coupon.id) {
                return Err(Error::DuplicateCouponId(coupon.id));
            }
        }
        Ok(())
    }
}

/// Per-coupon claim counter stored in `coupon-state.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsState {
    pub coupon_id: u64,
    pub current_claims: u32,
    pub last_updated: DateTime<Utc>,
}

impl ClaimsState {
    /// A counter that has never been claimed
    pub fn unclaimed(coupon_id: u64, now: DateTime<Utc>) -> Self {
        Self {
            coupon_id,
            current_claims: 0,
            last_updated: now,
        }
    }

    /// Record one claim against this counter
    pub fn record_claim(&mut self, now: DateTime<Utc>) {
        self.current_claims = self.current_claims.saturating_add(1);
        self.last_updated = now;
    }

    /// Increment the entry for `coupon_id` inside a loaded claims collection,
    /// appending a fresh entry when none exists. Returns the updated entry.
    pub fn apply_claim(
        states: &mut Vec<ClaimsState>,
        coupon_id: u64,
        now: DateTime<Utc>,
    ) -> ClaimsState {
        match states.iter_mut().find(|s| s.coupon_id == coupon_id) {
            Some(state) => {
                state.record_claim(now);
                state.clone()
            }
            None => {
                let mut state = ClaimsState::unclaimed(coupon_id, now);
                state.record_claim(now);
                states.push(state.clone());
                state
            }
        }
    }
}

/// Id of a history record
///
/// New ids are whole milliseconds, but documents migrated from older
/// deployments carry fractional ids. Any JSON number is accepted and written
/// back exactly as it was read. Ordering is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryId(Number);

impl HistoryId {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }

    /// Smallest whole id strictly greater than this one
    fn successor(&self) -> u64 {
        match self.0.as_u64() {
            Some(id) => id.saturating_add(1),
            None => (self.as_f64().max(0.0).floor() as u64).saturating_add(1),
        }
    }
}

impl From<u64> for HistoryId {
    fn from(id: u64) -> Self {
        Self(Number::from(id))
    }
}

impl Ord for HistoryId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.as_u64(), other.0.as_u64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl PartialOrd for HistoryId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Append-only redemption log entry stored in `request-history.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Wall-clock derived id (milliseconds since the epoch)
    pub id: HistoryId,

    /// Not required to reference an existing or active coupon
    pub coupon_id: u64,

    /// Coupon title as it was when redeemed
    pub title: String,

    #[serde(default)]
    pub details: String,

    pub timestamp: DateTime<Utc>,

    /// Written by older deployments. Kept so rewriting the log preserves it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_by: Option<String>,
}

impl HistoryRecord {
    /// Build a record for a validated redemption, with an id that does not
    /// collide with anything in `existing`
    pub fn new(redemption: &Redemption, existing: &[HistoryRecord], now: DateTime<Utc>) -> Self {
        Self {
            id: Self::next_id(existing, now),
            coupon_id: redemption.coupon_id,
            title: redemption.title.clone(),
            details: redemption.details.clone(),
            timestamp: now,
            redeemed_by: None,
        }
    }

    /// Millisecond timestamp, bumped past the largest id already in use
    pub fn next_id(existing: &[HistoryRecord], now: DateTime<Utc>) -> HistoryId {
        let clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let next = match existing.iter().map(|r| &r.id).max() {
            Some(max) if *max >= HistoryId::from(clock) => max.successor(),
            _ => clock,
        };
        HistoryId::from(next)
    }
}

/// Loose body of `POST /api/redeem`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    #[serde(default)]
    pub coupon_id: Option<u64>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub details: Option<String>,
}

/// A redemption intent that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub coupon_id: u64,
    pub title: String,
    pub details: String,
}

impl RedeemRequest {
    /// Turn the loose request into a [`Redemption`]. This runs before any
    /// store access.
    pub fn validate(self) -> Result<Redemption> {
        let coupon_id = match self.coupon_id {
            Some(id) if id > 0 => id,
            Some(_) => return Err(Error::validation("couponId", "couponId must be positive")),
            None => return Err(Error::validation("couponId", "couponId is required")),
        };

        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(Error::validation("title", "title is required")),
        };

        Ok(Redemption {
            coupon_id,
            title,
            details: self.details.unwrap_or_default(),
        })
    }
}

/// Coupon card data served by `GET /api/coupons`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponView {
    pub id: u64,
    pub title: String,
    pub desc: String,
    #[serde(rename = "iconName")]
    pub icon_tag: String,
    pub max_claims: u32,
    pub current_claims: u32,
}

/// History entry served by `GET /api/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryViewItem {
    pub id: HistoryId,
    pub coupon_id: u64,
    pub title: String,
    /// Unix seconds, fractional
    pub timestamp: f64,
    pub details: String,
}
