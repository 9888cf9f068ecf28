use super::util::{atomic_write_bytes, with_file_lock};
use super::{Documents, ReportStore, SavedReportPointer, SavedReportView, ScanRecord, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use posture_core::ScanSummary;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keeps the whole store in one JSON file. Every operation holds an
/// exclusive lock on `<path>.lock`, so concurrent writers in this or other
/// processes are serialized and the last write wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Documents) -> T + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            with_file_lock::<_, _, StoreError>(&path, || {
                let docs = load(&path)?;
                Ok(op(&docs))
            })
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn modify<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Documents) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            with_file_lock::<_, _, StoreError>(&path, || {
                let mut docs = load(&path)?;
                let out = op(&mut docs)?;
                let bytes = serde_json::to_vec_pretty(&docs)?;
                atomic_write_bytes(&path, &bytes)?;
                debug!(path = %path.display(), bytes = bytes.len(), "store written");
                Ok(out)
            })
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn load(path: &Path) -> Result<Documents, StoreError> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Documents::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Documents::default()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ReportStore for FileStore {
    async fn upsert_scan(
        &self,
        target: &str,
        url: &str,
        result: ScanSummary,
    ) -> Result<ScanRecord, StoreError> {
        let (target, url) = (target.to_string(), url.to_string());
        self.modify(move |docs| Ok(docs.upsert_scan(&target, &url, result, Utc::now())))
            .await
    }

    async fn list_scans(&self) -> Result<Vec<ScanRecord>, StoreError> {
        self.read(|docs| docs.list_scans()).await
    }

    async fn get_scan(&self, id: &str) -> Result<Option<ScanRecord>, StoreError> {
        let id = id.to_string();
        self.read(move |docs| docs.get_scan(&id)).await
    }

    async fn upsert_saved_report(
        &self,
        domain: &str,
        scan_id: &str,
    ) -> Result<SavedReportPointer, StoreError> {
        let (domain, scan_id) = (domain.to_string(), scan_id.to_string());
        self.modify(move |docs| docs.upsert_saved_report(&domain, &scan_id, Utc::now()))
            .await
    }

    async fn list_saved_reports(&self) -> Result<Vec<SavedReportView>, StoreError> {
        self.read(|docs| docs.list_saved_reports()).await
    }

    async fn delete_saved_report(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.modify(move |docs| Ok(docs.delete_saved_report(&id)))
            .await
    }
}
