use crate::catalog::loader::{load_snapshot, CatalogSnapshot, DataFiles};
use crate::error::{HotelMatchError, Result};
use crate::types::{CatalogRecord, PropertyRecord};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only source of the property and its candidate catalog.
///
/// Injected into the server so the pipeline only ever sees explicit inputs.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn property(&self) -> Result<PropertyRecord>;
    async fn records(&self) -> Result<Arc<[CatalogRecord]>>;
    fn is_loaded(&self) -> bool;
}

/// Repository over data already in memory, used by tests and the `triage` command
pub struct InMemoryCatalogRepository {
    snapshot: CatalogSnapshot,
}

impl InMemoryCatalogRepository {
    pub fn new(property: PropertyRecord, records: Vec<CatalogRecord>) -> Self {
        Self {
            snapshot: CatalogSnapshot {
                property,
                records: records.into(),
            },
        }
    }
}

impl From<CatalogSnapshot> for InMemoryCatalogRepository {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn property(&self) -> Result<PropertyRecord> {
        Ok(self.snapshot.property.clone())
    }

    async fn records(&self) -> Result<Arc<[CatalogRecord]>> {
        Ok(self.snapshot.records.clone())
    }

    fn is_loaded(&self) -> bool {
        true
    }
}

/// Repository backed by the two CSV files.
///
/// Files are read at most once. A failed load is not cached, so the next
/// request retries (e.g. after `generate` has been run).
pub struct CsvCatalogRepository {
    files: DataFiles,
    snapshot: OnceCell<CatalogSnapshot>,
}

impl CsvCatalogRepository {
    pub fn new(files: DataFiles) -> Self {
        Self {
            files,
            snapshot: OnceCell::new(),
        }
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    /// Load eagerly, typically at startup
    pub fn warm(&self) -> Result<()> {
        self.snapshot().map(|_| ())
    }

    fn snapshot(&self) -> Result<&CatalogSnapshot> {
        self.snapshot.get_or_try_init(|| {
            debug!("Loading catalog snapshot from {:?}", self.files);
            load_snapshot(&self.files).map_err(|e| {
                warn!("Catalog load failed: {}", e);
                HotelMatchError::DataLoad(e.to_string())
            })
        })
    }
}

#[async_trait]
impl CatalogRepository for CsvCatalogRepository {
    async fn property(&self) -> Result<PropertyRecord> {
        Ok(self.snapshot()?.property.clone())
    }

    async fn records(&self) -> Result<Arc<[CatalogRecord]>> {
        Ok(self.snapshot()?.records.clone())
    }

    fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }
}
