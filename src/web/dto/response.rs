//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{FileRecord, StorageStats, SyncReport};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// File metadata as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    /// Name without extension.
    pub name: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    /// Name and extension together.
    pub filename: String,
    pub size: i64,
    /// Directory relative to the storage root (`""` is the root).
    pub path: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last change, if any.
    pub updated_at: Option<String>,
    pub comment: Option<String>,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            filename: file.file_name(),
            id: file.id,
            name: file.name,
            extension: file.extension,
            size: file.size,
            path: file.path,
            created_at: file.created_at.to_rfc3339(),
            updated_at: file.updated_at.map(|t| t.to_rfc3339()),
            comment: file.comment,
        }
    }
}

/// Acknowledgement for a deleted file.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub status: String,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self {
            status: "deleted".to_string(),
        }
    }
}

/// Result of `POST /api/actualize`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    /// Rows created for untracked files.
    pub added: usize,
    /// Rows removed because their file was missing.
    pub removed: usize,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            added: report.added,
            removed: report.removed,
        }
    }
}

/// Aggregate storage numbers.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub file_count: i64,
    pub total_size: i64,
}

impl From<StorageStats> for StatsResponse {
    fn from(stats: StorageStats) -> Self {
        Self {
            file_count: stats.file_count,
            total_size: stats.total_size,
        }
    }
}
