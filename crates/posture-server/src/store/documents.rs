use super::{ScanRecord, ScanSnapshot, SavedReportPointer, SavedReportView, StoreError};
use chrono::{DateTime, Utc};
use posture_core::ScanSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The whole store as one document. Every backend operation is a read or a
/// read-modify-write of this value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Documents {
    pub scans: Vec<ScanRecord>,
    pub saved_reports: Vec<SavedReportPointer>,
}

impl Documents {
    pub fn upsert_scan(
        &mut self,
        target: &str,
        url: &str,
        result: ScanSummary,
        now: DateTime<Utc>,
    ) -> ScanRecord {
        if let Some(existing) = self.scans.iter_mut().find(|s| s.target == target) {
            existing.url = url.to_string();
            existing.result = result;
            existing.timestamp = now;
            existing.updated_at = now;
            return existing.clone();
        }

        let record = ScanRecord {
            id: Uuid::new_v4().to_string(),
            target: target.to_string(),
            url: url.to_string(),
            timestamp: now,
            result,
            created_at: now,
            updated_at: now,
        };
        self.scans.push(record.clone());
        record
    }

    pub fn list_scans(&self) -> Vec<ScanRecord> {
        let mut scans = self.scans.clone();
        scans.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        scans
    }

    pub fn get_scan(&self, id: &str) -> Option<ScanRecord> {
        self.scans.iter().find(|s| s.id == id).cloned()
    }

    pub fn upsert_saved_report(
        &mut self,
        domain: &str,
        scan_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SavedReportPointer, StoreError> {
        if !self.scans.iter().any(|s| s.id == scan_id) {
            return Err(StoreError::UnknownScan(scan_id.to_string()));
        }

        if let Some(existing) = self.saved_reports.iter_mut().find(|p| p.domain == domain) {
            existing.scan_id = scan_id.to_string();
            return Ok(existing.clone());
        }

        let pointer = SavedReportPointer {
            id: Uuid::new_v4().to_string(),
            domain: domain.to_string(),
            scan_id: scan_id.to_string(),
            created_at: now,
        };
        self.saved_reports.push(pointer.clone());
        Ok(pointer)
    }

    pub fn list_saved_reports(&self) -> Vec<SavedReportView> {
        let mut views: Vec<SavedReportView> = self
            .saved_reports
            .iter()
            .map(|pointer| SavedReportView {
                pointer: pointer.clone(),
                scan: self
                    .scans
                    .iter()
                    .find(|s| s.id == pointer.scan_id)
                    .map(|s| ScanSnapshot {
                        target: s.target.clone(),
                        url: s.url.clone(),
                        result: s.result.clone(),
                        created_at: s.created_at,
                    }),
            })
            .collect();
        views.sort_by(|a, b| b.pointer.created_at.cmp(&a.pointer.created_at));
        views
    }

    pub fn delete_saved_report(&mut self, id: &str) -> bool {
        let before = self.saved_reports.len();
        self.saved_reports.retain(|p| p.id != id);
        self.saved_reports.len() != before
    }
}
