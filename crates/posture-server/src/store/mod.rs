//! Persistence for scan records and saved-report pointers.
//!
//! Both backends share the same document model ([`Documents`]); they differ
//! only in where the document lives and how writers are serialized.

mod documents;
mod file;
mod memory;
mod util;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use posture_config::{StoreBackend, StoreConfig};
use posture_core::ScanSummary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use documents::Documents;
pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("scan {0} not found")]
    UnknownScan(String),

    #[error("store task failed: {0}")]
    Task(String),
}

/// One persisted scan result. There is at most one record per `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub id: String,
    pub target: String,
    pub url: String,
    /// Time of the scan whose result is currently stored.
    pub timestamp: DateTime<Utc>,
    pub result: ScanSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bookmark pointing at a [`ScanRecord`]. At most one per `domain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReportPointer {
    pub id: String,
    pub domain: String,
    pub scan_id: String,
    pub created_at: DateTime<Utc>,
}

/// The subset of the referenced record joined into saved-report listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSnapshot {
    pub target: String,
    pub url: String,
    pub result: ScanSummary,
    pub created_at: DateTime<Utc>,
}

/// A pointer with its record joined in. `scan` is `None` when the record
/// it points at no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReportView {
    #[serde(flatten)]
    pub pointer: SavedReportPointer,
    pub scan: Option<ScanSnapshot>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Replace-or-insert keyed by `target`; the last write wins.
    async fn upsert_scan(
        &self,
        target: &str,
        url: &str,
        result: ScanSummary,
    ) -> Result<ScanRecord, StoreError>;

    /// All records, newest `timestamp` first.
    async fn list_scans(&self) -> Result<Vec<ScanRecord>, StoreError>;

    async fn get_scan(&self, id: &str) -> Result<Option<ScanRecord>, StoreError>;

    /// Replace-or-insert keyed by `domain`. Fails with
    /// [`StoreError::UnknownScan`] when `scan_id` names no record.
    async fn upsert_saved_report(
        &self,
        domain: &str,
        scan_id: &str,
    ) -> Result<SavedReportPointer, StoreError>;

    /// All pointers, newest `createdAt` first, joined with their records.
    async fn list_saved_reports(&self) -> Result<Vec<SavedReportView>, StoreError>;

    /// Returns `false` when no pointer has this id.
    async fn delete_saved_report(&self, id: &str) -> Result<bool, StoreError>;
}

pub fn open_store(config: &StoreConfig) -> Arc<dyn ReportStore> {
    match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::new(config.path.clone())),
    }
}
