//! Read-side projections consumed by the UI
//!
//! Both functions are pure: no store access, no clock.

use std::collections::HashMap;

use crate::models::{ClaimsState, CouponDefinition, CouponView, HistoryRecord, HistoryViewItem};

/// Key a loaded claims collection by coupon id. The first row for an id wins,
/// the same row [`ClaimsState::apply_claim`] increments.
pub fn index_claims(states: Vec<ClaimsState>) -> HashMap<u64, ClaimsState> {
    let mut index = HashMap::with_capacity(states.len());
    for state in states {
        index.entry(state.coupon_id).or_insert(state);
    }
    index
}

/// Left-join active definitions with their claim counters, keeping catalog
/// order. Coupons without a counter report zero claims.
pub fn project_coupons(
    definitions: &[CouponDefinition],
    states: &HashMap<u64, ClaimsState>,
) -> Vec<CouponView> {
    definitions
        .iter()
        .filter(|d| d.is_active)
        .map(|d| CouponView {
            id: d.id,
            title: d.title.clone(),
            desc: d.description.clone(),
            icon_tag: d.icon_tag.clone(),
            max_claims: d.max_claims,
            current_claims: states.get(&d.id).map_or(0, |s| s.current_claims),
        })
        .collect()
}

/// Newest-first history for display. Ties on timestamp fall back to the id.
pub fn project_history(mut records: Vec<HistoryRecord>) -> Vec<HistoryViewItem> {
    records.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });

    records
        .into_iter()
        .map(|r| HistoryViewItem {
            id: r.id,
            coupon_id: r.coupon_id,
            title: r.title,
            timestamp: r.timestamp.timestamp_millis() as f64 / 1000.0,
            details: r.details,
        })
        .collect()
}
