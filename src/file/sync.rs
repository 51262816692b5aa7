//! Storage/metadata reconciliation.
//!
//! The directory tree is the source of truth for which files exist; the
//! table is the source of truth for comments and creation times. A sync
//! brings the set of `(name, extension, path)` keys in the table in line
//! with the set found on disk and leaves every other column alone.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use super::metadata::{FileRecord, FileRepository, NewFile};
use super::storage::{FileKey, FileStorage};
use crate::Result;

/// Outcome of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Rows created for files found on disk.
    pub added: usize,
    /// Rows deleted because their file is gone.
    pub removed: usize,
}

/// Reconcile the metadata table with the files under the storage root.
///
/// Files on disk without a row get one, with the recorded size and the
/// file's modification time standing in for its creation time. Rows whose
/// file is missing are deleted; the disk is never modified. Files present
/// on both sides are not compared, so content changes made outside the
/// service go unnoticed.
///
/// A file renamed on disk whose row was never updated shows up as one
/// removal plus one addition: the new row has a fresh ID and no comment.
pub async fn reconcile(storage: &FileStorage, repo: &FileRepository<'_>) -> Result<SyncReport> {
    let scanned = storage.scan()?;
    let records = repo.list_all().await?;

    let on_disk: HashSet<&FileKey> = scanned.iter().map(|f| &f.key).collect();
    let recorded: HashSet<FileKey> = records.iter().map(FileRecord::key).collect();

    let mut report = SyncReport::default();

    for file in scanned.iter().filter(|f| !recorded.contains(&f.key)) {
        let new_file =
            NewFile::new(file.key.clone(), file.size).with_created_at(file.modified_at);
        repo.create(&new_file).await?;
        info!(file = %file.key, size = file.size, "Registered untracked file");
        report.added += 1;
    }

    for record in records.iter().filter(|r| !on_disk.contains(&r.key())) {
        repo.delete(record.id).await?;
        warn!(id = record.id, file = %record.key(), "Dropped record for missing file");
        report.removed += 1;
    }

    info!(
        added = report.added,
        removed = report.removed,
        "Sync complete"
    );
    Ok(report)
}
