//! Database schema and migrations for filekeep.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have already run.

/// Database migrations.
///
/// Each migration is a SQL script executed inside its own transaction.
pub const MIGRATIONS: &[&str] = &[
    // v1: files table
    r#"
-- One row per stored file. (name, extension, path) identifies the file on disk.
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    extension   TEXT NOT NULL DEFAULT '',    -- includes the leading dot
    size        INTEGER NOT NULL CHECK (size >= 0),
    path        TEXT NOT NULL DEFAULT '',    -- relative to the storage root
    created_at  TEXT NOT NULL,
    updated_at  TEXT,
    comment     TEXT,
    UNIQUE (name, extension, path)
);

CREATE INDEX idx_files_path ON files(path);
"#,
];
