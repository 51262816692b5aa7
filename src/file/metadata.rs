//! File metadata types and repository for filekeep.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use super::storage::FileKey;
use crate::{FilekeepError, Result};

const SELECT_COLUMNS: &str =
    "SELECT id, name, extension, size, path, created_at, updated_at, comment FROM files";

/// Metadata row for a stored file.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID.
    pub id: i64,
    /// Name without extension.
    pub name: String,
    /// Extension with its leading dot, or empty.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Directory relative to the storage root (`""` is the root).
    pub path: String,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// Last change to name, path or comment.
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl FileRecord {
    /// The `(name, extension, path)` identity of this file.
    pub fn key(&self) -> FileKey {
        FileKey::new(
            self.name.as_str(),
            self.extension.as_str(),
            self.path.as_str(),
        )
    }

    /// Filename including the extension.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub extension: String,
    pub size: i64,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub comment: Option<String>,
}

impl NewFile {
    /// Create a new record for `key`, stamped with the current time.
    pub fn new(key: FileKey, size: i64) -> Self {
        Self {
            name: key.name,
            extension: key.extension,
            size,
            path: key.path,
            created_at: Utc::now(),
            comment: None,
        }
    }

    /// Override the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Changes to apply to a file record.
///
/// Only `name`, `path` and `comment` can change after creation. Any
/// non-empty update also refreshes `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub path: Option<String>,
    pub comment: Option<String>,
}

impl FileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the new relative path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the new comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.path.is_none() && self.comment.is_none()
    }
}

/// Repository for file metadata.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record.
    ///
    /// Fails with [`FilekeepError::Duplicate`] if another record already has
    /// the same `(name, extension, path)`.
    pub async fn create(&self, file: &NewFile) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (name, extension, size, path, created_at, comment)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.name)
        .bind(&file.extension)
        .bind(file.size)
        .bind(&file.path)
        .bind(file.created_at)
        .bind(&file.comment)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.require(id).await
    }

    /// Get a record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(file)
    }

    /// Get a record by ID, failing with [`FilekeepError::NotFound`].
    pub async fn require(&self, id: i64) -> Result<FileRecord> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| FilekeepError::NotFound(format!("File {id}")))
    }

    /// Get a record by its `(name, extension, path)` key.
    pub async fn get_by_key(&self, key: &FileKey) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "{SELECT_COLUMNS} WHERE name = ? AND extension = ? AND path = ?"
        ))
        .bind(&key.name)
        .bind(&key.extension)
        .bind(&key.path)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// List every record, ordered by path, name, extension and id.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY path, name, extension, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(files)
    }

    /// Update a record.
    ///
    /// Returns `None` if no record has the given ID.
    pub async fn update(&self, id: i64, update: &FileUpdate) -> Result<Option<FileRecord>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(ref path) = update.path {
            separated.push("path = ");
            separated.push_bind_unseparated(path);
        }

        if let Some(ref comment) = update.comment {
            separated.push("comment = ");
            separated.push_bind_unseparated(comment);
        }

        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a record. Returns `false` if it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a record with this key exists.
    pub async fn exists(&self, key: &FileKey) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM files WHERE name = ? AND extension = ? AND path = ?)",
        )
        .bind(&key.name)
        .bind(&key.extension)
        .bind(&key.path)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Count records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of all recorded sizes.
    pub async fn total_size(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(size), 0) FROM files")
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }
}
