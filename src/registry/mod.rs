//! Document lifecycle registry
//!
//! Tracks the single active document's state. The at-most-one-record
//! invariant is structural: registering an upload purges every existing
//! record under the same write lock, so two interleaved uploads cannot
//! leave two records behind.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::types::{DocumentRecord, DocumentStatus};

/// Registry of document records, persisted to a JSON snapshot so status
/// survives restarts alongside the persisted index.
pub struct DocumentRegistry {
    records: RwLock<HashMap<String, DocumentRecord>>,
    snapshot_path: PathBuf,
}

impl DocumentRegistry {
    /// Open the registry, loading the snapshot at `snapshot_path` if present
    pub fn open(snapshot_path: impl Into<PathBuf>) -> Self {
        let snapshot_path = snapshot_path.into();
        let records = Self::load_snapshot(&snapshot_path);
        if !records.is_empty() {
            tracing::info!(count = records.len(), "loaded document registry snapshot");
        }
        Self {
            records: RwLock::new(records),
            snapshot_path,
        }
    }

    fn load_snapshot(path: &PathBuf) -> HashMap<String, DocumentRecord> {
        let mut records = HashMap::new();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<Vec<DocumentRecord>>(&content) {
                    Ok(list) => {
                        for record in list {
                            records.insert(record.filename.clone(), record);
                        }
                    }
                    Err(e) => tracing::warn!("failed to parse registry snapshot: {}", e),
                },
                Err(e) => tracing::warn!("failed to read registry snapshot: {}", e),
            }
        }
        records
    }

    fn save_snapshot(&self, records: &HashMap<String, DocumentRecord>) {
        let list: Vec<&DocumentRecord> = records.values().collect();
        match serde_json::to_string_pretty(&list) {
            Ok(content) => {
                if let Some(parent) = self.snapshot_path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                if let Err(e) = fs::write(&self.snapshot_path, content) {
                    tracing::error!("failed to write registry snapshot: {}", e);
                }
            }
            Err(e) => tracing::error!("failed to serialize registry: {}", e),
        }
    }

    /// Purge every record and create the `uploaded` record for a new file.
    /// Returns the purged records so the caller can clean up their files
    /// and indexes.
    pub fn register_upload(&self, filename: &str) -> (DocumentRecord, Vec<DocumentRecord>) {
        let mut records = self.records.write();

        let purged: Vec<DocumentRecord> = records.drain().map(|(_, r)| r).collect();
        for old in &purged {
            // replacement discards any prior error history; keep a trace
            tracing::info!(
                filename = %old.filename,
                status = %old.status,
                "purging document record for replacement upload"
            );
        }

        let record = DocumentRecord::uploaded(filename.to_string());
        records.insert(filename.to_string(), record.clone());
        self.save_snapshot(&records);

        (record, purged)
    }

    /// Transition a record into `processing`. Allowed from any state, so a
    /// failed or already-indexed document can be reprocessed.
    pub fn begin_processing(&self, filename: &str) -> Result<DocumentRecord> {
        self.update(filename, |record| record.mark_processing())
    }

    /// Record a successful index build
    pub fn mark_indexed(&self, filename: &str, chunk_count: u32) -> Result<DocumentRecord> {
        self.update(filename, |record| record.mark_indexed(chunk_count))
    }

    /// Record a processing failure with its detail
    pub fn mark_error(&self, filename: &str, detail: String) -> Result<DocumentRecord> {
        self.update(filename, |record| record.mark_error(detail))
    }

    fn update(
        &self,
        filename: &str,
        apply: impl FnOnce(&mut DocumentRecord),
    ) -> Result<DocumentRecord> {
        let mut records = self.records.write();
        let record = records
            .get_mut(filename)
            .ok_or_else(|| Error::DocumentNotFound(filename.to_string()))?;
        apply(record);
        let updated = record.clone();
        self.save_snapshot(&records);
        Ok(updated)
    }

    /// Remove a record; unknown identifiers are a not-found error, never a
    /// panic
    pub fn remove(&self, filename: &str) -> Result<DocumentRecord> {
        let mut records = self.records.write();
        let record = records
            .remove(filename)
            .ok_or_else(|| Error::DocumentNotFound(filename.to_string()))?;
        self.save_snapshot(&records);
        Ok(record)
    }

    /// Get a record by filename
    pub fn get(&self, filename: &str) -> Option<DocumentRecord> {
        self.records.read().get(filename).cloned()
    }

    /// The single active record, if any
    pub fn active(&self) -> Option<DocumentRecord> {
        self.records.read().values().next().cloned()
    }

    /// Number of records (0 or 1 by construction)
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no document is registered
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
