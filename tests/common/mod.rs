//! Test helpers for integration tests.
//!
//! Provides an in-memory database paired with a temporary storage root.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;

use filekeep::file::FileStorage;
use filekeep::web::handlers::AppState;
use filekeep::web::router::{create_health_router, create_router};
use filekeep::Database;

/// Database and storage backed by throwaway locations.
pub struct TestEnv {
    pub db: Arc<Database>,
    pub storage: Arc<FileStorage>,
    /// Keeps the storage root alive for the duration of the test.
    pub temp_dir: TempDir,
}

impl TestEnv {
    /// Create an environment with an in-memory database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let storage = FileStorage::new(temp_dir.path()).expect("Failed to create storage");

        Self {
            db: Arc::new(db),
            storage: Arc::new(storage),
            temp_dir,
        }
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        self.storage.base_path()
    }

    /// Application state with the given upload limit.
    pub fn app_state(&self, max_upload_size: u64) -> Arc<AppState> {
        Arc::new(
            AppState::new(self.db.clone(), self.storage.clone())
                .with_max_upload_size(max_upload_size),
        )
    }

    /// HTTP test server over the full router.
    pub fn server(&self, max_upload_size: u64) -> TestServer {
        let router = create_router(self.app_state(max_upload_size), &[])
            .merge(create_health_router());
        TestServer::new(router).expect("Failed to create test server")
    }
}
