use super::{Documents, ReportStore, SavedReportPointer, SavedReportView, ScanRecord, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use posture_core::ScanSummary;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn upsert_scan(
        &self,
        target: &str,
        url: &str,
        result: ScanSummary,
    ) -> Result<ScanRecord, StoreError> {
        let mut docs = self.docs.write().await;
        Ok(docs.upsert_scan(target, url, result, Utc::now()))
    }

    async fn list_scans(&self) -> Result<Vec<ScanRecord>, StoreError> {
        Ok(self.docs.read().await.list_scans())
    }

    async fn get_scan(&self, id: &str) -> Result<Option<ScanRecord>, StoreError> {
        Ok(self.docs.read().await.get_scan(id))
    }

    async fn upsert_saved_report(
        &self,
        domain: &str,
        scan_id: &str,
    ) -> Result<SavedReportPointer, StoreError> {
        let mut docs = self.docs.write().await;
        docs.upsert_saved_report(domain, scan_id, Utc::now())
    }

    async fn list_saved_reports(&self) -> Result<Vec<SavedReportView>, StoreError> {
        Ok(self.docs.read().await.list_saved_reports())
    }

    async fn delete_saved_report(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.delete_saved_report(id))
    }
}
