//! filekeep - a file storage service with a metadata index.
//!
//! Files live in a directory tree under one storage root; a SQLite table
//! records their names, sizes, creation times and comments. The
//! [`file::FileService`] keeps both sides in step, and [`file::reconcile`]
//! repairs drift after the tree is changed behind its back.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{FilekeepError, Result};
pub use file::{FileRecord, FileService, FileStorage, SyncReport};
