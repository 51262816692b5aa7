//! API handlers for the Web API.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::file::{FileService, FileStorage, DEFAULT_MAX_FILE_SIZE};
use crate::Database;

/// Shared application state.
pub struct AppState {
    /// Metadata database.
    pub db: Arc<Database>,
    /// Physical file storage.
    pub storage: Arc<FileStorage>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Remove directories left empty after moves and deletes.
    pub prune_empty_dirs: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, storage: Arc<FileStorage>) -> Self {
        Self {
            db,
            storage,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            prune_empty_dirs: false,
        }
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Enable or disable pruning of empty directories.
    pub fn with_prune_empty_dirs(mut self, prune: bool) -> Self {
        self.prune_empty_dirs = prune;
        self
    }

    /// Build a file service borrowing this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.storage)
            .with_max_file_size(self.max_upload_size)
            .with_prune_empty_dirs(self.prune_empty_dirs)
    }
}
