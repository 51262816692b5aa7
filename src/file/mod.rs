//! File management module for filekeep.
//!
//! This module provides:
//! - Path sanitization and containment checks
//! - Physical storage under a single root
//! - File metadata in SQLite
//! - Reconciliation between the two

mod metadata;
pub mod sanitize;
mod service;
mod storage;
mod sync;

pub use metadata::{FileRecord, FileRepository, FileUpdate, NewFile};
pub use service::{FileService, RenameRequest, StorageStats, UploadRequest};
pub use storage::{FileKey, FileStorage, MemoryUpload, ScannedFile, StoredFile, UploadSource};
pub use sync::{reconcile, SyncReport};

/// Maximum length for a requested filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length for a file comment (in characters).
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
