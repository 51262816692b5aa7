//! File service for filekeep.
//!
//! This module ties physical storage and metadata together:
//! - Upload with duplicate detection and rollback
//! - Rename/move with a metadata-first uniqueness check
//! - Delete with a configurable missing-file policy
//! - Sync between the storage tree and the table

use std::path::PathBuf;

use tracing::{info, warn};

use crate::db::Database;
use crate::{FilekeepError, Result};

use super::metadata::{FileRecord, FileRepository, FileUpdate, NewFile};
use super::sanitize::{is_root_alias, sanitize_segment};
use super::storage::{FileKey, FileStorage, MemoryUpload};
use super::sync::{self, SyncReport};
use super::{DEFAULT_MAX_FILE_SIZE, MAX_COMMENT_LENGTH, MAX_FILENAME_LENGTH};

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Uploaded content and the filename the client reported.
    pub source: MemoryUpload,
    /// Desired name; empty means "use the original filename".
    pub name: String,
    /// Target directory relative to the storage root.
    pub path: String,
    /// Comment (optional).
    pub comment: Option<String>,
}

impl UploadRequest {
    /// Create a new upload request for the storage root.
    pub fn new(original_filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            source: MemoryUpload::new(original_filename, content),
            name: String::new(),
            path: String::new(),
            comment: None,
        }
    }

    /// Set the desired name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the target directory.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Requested changes for an existing file. Absent fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct RenameRequest {
    pub name: Option<String>,
    pub path: Option<String>,
    pub comment: Option<String>,
}

impl RenameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Aggregate numbers about the stored files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub file_count: i64,
    pub total_size: i64,
}

/// File service coordinating storage and metadata.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    max_file_size: u64,
    prune_empty_dirs: bool,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            prune_empty_dirs: false,
        }
    }

    /// Create a new FileService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Remove directories left empty by moves and deletes.
    pub fn with_prune_empty_dirs(mut self, prune: bool) -> Self {
        self.prune_empty_dirs = prune;
        self
    }

    fn repo(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }

    /// Upload a file.
    ///
    /// The target key is computed first and rejected with
    /// [`FilekeepError::Duplicate`] if the table already has it or a file
    /// already sits at that location. The row is inserted after the content
    /// is on disk; if the insert fails the file is removed again.
    pub async fn upload(&self, request: &UploadRequest) -> Result<FileRecord> {
        if request.source.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(FilekeepError::Validation(format!(
                "file is too large (max {max_mb}MB)"
            )));
        }
        validate_name_length(&request.name)?;
        if let Some(ref comment) = request.comment {
            validate_comment(comment)?;
        }

        let repo = self.repo();
        let planned = self
            .storage
            .plan(&request.source, &request.name, &request.path)?;
        if repo.exists(&planned.key).await? || self.storage.exists(&planned.key) {
            return Err(FilekeepError::Duplicate(planned.key.to_string()));
        }

        let stored = self
            .storage
            .save(&request.source, &request.name, &request.path)?;

        let mut new_file = NewFile::new(stored.key.clone(), stored.size);
        if let Some(ref comment) = request.comment {
            new_file = new_file.with_comment(comment);
        }

        match repo.create(&new_file).await {
            Ok(file) => {
                info!(id = file.id, file = %stored.key, size = file.size, "Uploaded file");
                Ok(file)
            }
            Err(e) => {
                warn!(file = %stored.key, error = %e, "Insert failed, removing uploaded file");
                if let Err(cleanup) = self.storage.delete(&stored.key, true) {
                    warn!(file = %stored.key, error = %cleanup, "Failed to remove uploaded file");
                }
                Err(e)
            }
        }
    }

    /// Rename, move and/or re-comment a file.
    ///
    /// An absent or blank name keeps the current one; any other name is
    /// sanitized. An absent path keeps the current directory and every
    /// spelling of the root means the root. The extension never changes.
    pub async fn rename(&self, id: i64, request: &RenameRequest) -> Result<FileRecord> {
        let repo = self.repo();
        let file = repo.require(id).await?;
        let current = file.key();

        let new_name = match request.name.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                validate_name_length(raw)?;
                let name = sanitize_segment(raw);
                if name.is_empty() {
                    return Err(FilekeepError::Validation(format!(
                        "file name {raw:?} is empty after sanitization"
                    )));
                }
                name
            }
            _ => file.name.clone(),
        };

        let new_path = match request.path.as_deref() {
            None => file.path.clone(),
            Some(raw) if is_root_alias(raw) => String::new(),
            Some(raw) if raw == file.path => file.path.clone(),
            Some(raw) => self.storage.relative_dir(raw)?,
        };

        if let Some(ref comment) = request.comment {
            validate_comment(comment)?;
        }

        let target = FileKey::new(new_name.as_str(), file.extension.as_str(), new_path.as_str());
        if new_name != file.name {
            target.ensure_scannable()?;
        }
        let moved = target != current;
        if moved && repo.exists(&target).await? {
            return Err(FilekeepError::Duplicate(target.to_string()));
        }

        self.storage.move_file(&current, &new_name, &new_path)?;

        let mut update = FileUpdate::new();
        if new_name != file.name {
            update = update.name(new_name.as_str());
        }
        if new_path != file.path {
            update = update.path(new_path.as_str());
        }
        if let Some(ref comment) = request.comment {
            update = update.comment(comment.as_str());
        }

        let updated = match repo.update(id, &update).await {
            Ok(updated) => updated,
            Err(e) => {
                if moved {
                    warn!(id, error = %e, "Update failed, moving file back");
                    if let Err(undo) =
                        self.storage.move_file(&target, &current.name, &current.path)
                    {
                        warn!(id, error = %undo, "Failed to move file back");
                    }
                }
                return Err(e);
            }
        };
        let updated = updated.ok_or_else(|| FilekeepError::NotFound(format!("File {id}")))?;

        if moved {
            info!(id, from = %current, to = %target, "Renamed file");
            self.prune();
        }
        Ok(updated)
    }

    /// Delete a file and its record.
    ///
    /// With `silent_if_missing` a file that is already gone from disk still
    /// has its record deleted. Without it the call fails with
    /// [`FilekeepError::NotFound`] and the record is kept.
    pub async fn delete(&self, id: i64, silent_if_missing: bool) -> Result<()> {
        let repo = self.repo();
        let file = repo.require(id).await?;

        self.storage.delete(&file.key(), silent_if_missing)?;
        repo.delete(id).await?;

        info!(id, file = %file.key(), "Deleted file record");
        self.prune();
        Ok(())
    }

    /// List all files.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        self.repo().list_all().await
    }

    /// Get a file by ID.
    pub async fn get(&self, id: i64) -> Result<FileRecord> {
        self.repo().require(id).await
    }

    /// Absolute path of a file. The file itself may be missing.
    pub async fn absolute_path(&self, id: i64) -> Result<PathBuf> {
        let file = self.repo().require(id).await?;
        self.storage.absolute_path(&file.key())
    }

    /// Absolute path of a file that must exist on disk right now.
    pub async fn download_path(&self, id: i64) -> Result<(FileRecord, PathBuf)> {
        let file = self.repo().require(id).await?;
        let path = self.storage.absolute_path(&file.key())?;
        if !path.is_file() {
            return Err(FilekeepError::NotFound(format!("File {}", file.key())));
        }
        Ok((file, path))
    }

    /// Reconcile the table with the storage tree.
    pub async fn sync(&self) -> Result<SyncReport> {
        sync::reconcile(self.storage, &self.repo()).await
    }

    /// File count and total size as recorded in the table.
    pub async fn stats(&self) -> Result<StorageStats> {
        let repo = self.repo();
        Ok(StorageStats {
            file_count: repo.count().await?,
            total_size: repo.total_size().await?,
        })
    }

    /// Get the storage reference.
    pub fn storage(&self) -> &FileStorage {
        self.storage
    }

    /// Runs after the change is committed, so failures are only logged.
    fn prune(&self) {
        if !self.prune_empty_dirs {
            return;
        }
        if let Err(e) = self.storage.cleanup_empty_dirs() {
            warn!(error = %e, "Failed to remove empty directories");
        }
    }
}

fn validate_name_length(name: &str) -> Result<()> {
    if name.chars().count() > MAX_FILENAME_LENGTH {
        return Err(FilekeepError::Validation(format!(
            "file name must be at most {MAX_FILENAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_comment(comment: &str) -> Result<()> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(FilekeepError::Validation(format!(
            "comment must be at most {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}
