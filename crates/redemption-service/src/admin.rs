//! Out-of-band administration: seeding, bulk reset and catalog import

use anyhow::{Context, Result};
use chrono::Utc;
use coupon_common::{ClaimsState, CouponDefinition, HistoryRecord};
use std::path::Path;
use tracing::info;

use crate::repositories::{
    CatalogRepository, ClaimsRepository, HistoryRepository, CATALOG_DOCUMENT, CLAIMS_DOCUMENT,
    HISTORY_DOCUMENT,
};
use crate::store::{self, SharedStore, StoreError};

/// Which documents `initialize` had to create
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub catalog_created: bool,
    pub claims_created: bool,
    pub history_created: bool,
}

/// Write defaults for whichever of the three documents is missing. Existing
/// documents are left as they are.
pub async fn initialize(
    store: &SharedStore,
    catalog: &[CouponDefinition],
) -> Result<InitReport, StoreError> {
    let mut report = InitReport::default();

    if store.get(CATALOG_DOCUMENT).await?.is_none() {
        store::save(store.as_ref(), CATALOG_DOCUMENT, catalog).await?;
        info!("Created {} with {} coupons", CATALOG_DOCUMENT, catalog.len());
        report.catalog_created = true;
    }

    if store.get(CLAIMS_DOCUMENT).await?.is_none() {
        let now = Utc::now();
        let states: Vec<ClaimsState> = catalog
            .iter()
            .map(|c| ClaimsState::unclaimed(c.id, now))
            .collect();
        store::save(store.as_ref(), CLAIMS_DOCUMENT, &states).await?;
        info!("Created {}", CLAIMS_DOCUMENT);
        report.claims_created = true;
    }

    if store.get(HISTORY_DOCUMENT).await?.is_none() {
        store::save::<[HistoryRecord]>(store.as_ref(), HISTORY_DOCUMENT, &[]).await?;
        info!("Created {}", HISTORY_DOCUMENT);
        report.history_created = true;
    }

    Ok(report)
}

/// Clear every claim counter and the whole redemption history
pub async fn reset(store: &SharedStore) -> Result<(), StoreError> {
    ClaimsRepository::new(store.clone()).reset().await?;
    HistoryRepository::new(store.clone()).reset().await?;
    Ok(())
}

/// Read and validate a catalog file
pub fn read_catalog_file(path: &Path) -> Result<Vec<CouponDefinition>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let catalog: Vec<CouponDefinition> = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a list of coupons", path.display()))?;

    CouponDefinition::validate_catalog(&catalog)
        .with_context(|| format!("{} failed validation", path.display()))?;

    Ok(catalog)
}

/// Replace the stored catalog with the contents of a file
pub async fn sync_catalog(store: &SharedStore, path: &Path) -> Result<usize> {
    let catalog = read_catalog_file(path)?;

    CatalogRepository::new(store.clone(), Vec::new())
        .replace(&catalog)
        .await
        .context("Failed to upload catalog")?;

    Ok(catalog.len())
}
