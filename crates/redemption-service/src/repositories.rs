//! Catalog, claims-state and history repositories
//!
//! Each repository owns one named document. Mutating methods read the whole
//! document, change it in memory and write the whole document back. Two
//! callers doing this at the same time will lose one of the updates; nothing
//! here locks or checks versions.

use chrono::Utc;
use coupon_common::{index_claims, ClaimsState, CouponDefinition, HistoryRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::store::{self, SharedStore, StoreError};

pub const CATALOG_DOCUMENT: &str = "coupons.json";
pub const CLAIMS_DOCUMENT: &str = "coupon-state.json";
pub const HISTORY_DOCUMENT: &str = "request-history.json";

/// Coupon definitions, read-only from the redemption path
#[derive(Clone)]
pub struct CatalogRepository {
    store: SharedStore,
    fallback: Arc<Vec<CouponDefinition>>,
}

impl CatalogRepository {
    /// `fallback` is served whenever the stored catalog is missing or
    /// unreadable
    pub fn new(store: SharedStore, fallback: Vec<CouponDefinition>) -> Self {
        Self {
            store,
            fallback: Arc::new(fallback),
        }
    }

    pub fn fallback(&self) -> &[CouponDefinition] {
        &self.fallback
    }

    /// Every definition, active or not, in stored order
    pub async fn list_all(&self) -> Vec<CouponDefinition> {
        match store::load::<Vec<CouponDefinition>>(self.store.as_ref(), CATALOG_DOCUMENT).await {
            Ok(Some(catalog)) => catalog,
            Ok(None) => {
                debug!("{} not found, using built-in catalog", CATALOG_DOCUMENT);
                self.fallback.to_vec()
            }
            Err(e) => {
                warn!("Failed to read catalog, using built-in catalog: {}", e);
                self.fallback.to_vec()
            }
        }
    }

    /// Active definitions in stored order
    pub async fn list_active(&self) -> Vec<CouponDefinition> {
        self.list_all()
            .await
            .into_iter()
            .filter(|c| c.is_active)
            .collect()
    }

    pub async fn get_by_id(&self, id: u64) -> Option<CouponDefinition> {
        self.list_all().await.into_iter().find(|c| c.id == id)
    }

    /// Overwrite the stored catalog
    pub async fn replace(&self, catalog: &[CouponDefinition]) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), CATALOG_DOCUMENT, catalog).await?;
        info!("Replaced catalog with {} coupons", catalog.len());
        Ok(())
    }
}

/// Per-coupon claim counters
#[derive(Clone)]
pub struct ClaimsRepository {
    store: SharedStore,
}

impl ClaimsRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored collection, empty when the document does not exist
    pub async fn load(&self) -> Result<Vec<ClaimsState>, StoreError> {
        Ok(store::load(self.store.as_ref(), CLAIMS_DOCUMENT)
            .await?
            .unwrap_or_default())
    }

    pub async fn save(&self, states: &[ClaimsState]) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), CLAIMS_DOCUMENT, states).await
    }

    /// Counters keyed by coupon id
    pub async fn get_all(&self) -> Result<HashMap<u64, ClaimsState>, StoreError> {
        Ok(index_claims(self.load().await?))
    }

    /// Add one claim to `coupon_id`, creating its counter at 1 if absent.
    /// Not atomic: see the module docs.
    pub async fn increment(&self, coupon_id: u64) -> Result<ClaimsState, StoreError> {
        let mut states = self.load().await?;
        let updated = ClaimsState::apply_claim(&mut states, coupon_id, Utc::now());
        self.save(&states).await?;
        Ok(updated)
    }

    /// Drop every counter
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.save(&[]).await?;
        info!("Reset {}", CLAIMS_DOCUMENT);
        Ok(())
    }
}

/// Redemption log
#[derive(Clone)]
pub struct HistoryRepository {
    store: SharedStore,
}

impl HistoryRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stored records in stored order, empty when the document does not exist
    pub async fn load(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(store::load(self.store.as_ref(), HISTORY_DOCUMENT)
            .await?
            .unwrap_or_default())
    }

    pub async fn save(&self, records: &[HistoryRecord]) -> Result<(), StoreError> {
        store::save(self.store.as_ref(), HISTORY_DOCUMENT, records).await
    }

    /// All records, unsorted
    pub async fn get_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        self.load().await
    }

    /// Append one record. Not atomic: see the module docs.
    pub async fn append(&self, record: HistoryRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await
    }

    /// Drop every record
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.save(&[]).await?;
        info!("Reset {}", HISTORY_DOCUMENT);
        Ok(())
    }
}
