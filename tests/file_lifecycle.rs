//! File lifecycle tests against the service layer.
//!
//! Exercises upload, rename, sync and delete together on a real directory
//! tree and checks that the table and the tree agree after every step.

mod common;

use std::collections::HashSet;
use std::fs;

use common::TestEnv;
use filekeep::file::{FileKey, FileService, RenameRequest, UploadRequest};
use filekeep::FilekeepError;

async fn assert_consistent(service: &FileService<'_>) {
    let on_disk: HashSet<FileKey> = service
        .storage()
        .scan()
        .unwrap()
        .into_iter()
        .map(|f| f.key)
        .collect();
    let recorded: HashSet<FileKey> = service
        .list()
        .await
        .unwrap()
        .iter()
        .map(|f| f.key())
        .collect();
    assert_eq!(on_disk, recorded);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let env = TestEnv::new().await;
    let service = FileService::new(&env.db, &env.storage).with_prune_empty_dirs(true);

    let report = service
        .upload(
            &UploadRequest::new("Отчет за март.txt", b"march".to_vec())
                .with_path("reports")
                .with_comment("monthly"),
        )
        .await
        .unwrap();
    assert_eq!(report.name, "Otchet_za_mart");
    assert_eq!(report.path, "reports");
    assert_consistent(&service).await;

    let moved = service
        .rename(report.id, &RenameRequest::new().name("march").path("/"))
        .await
        .unwrap();
    assert_eq!(moved.id, report.id);
    assert_eq!(moved.file_name(), "march.txt");
    assert_eq!(moved.path, "");
    assert_eq!(moved.comment.as_deref(), Some("monthly"));
    assert!(!env.root().join("reports").exists());
    assert_consistent(&service).await;

    fs::write(env.root().join("manual.log"), b"added by hand").unwrap();
    let sync = service.sync().await.unwrap();
    assert_eq!((sync.added, sync.removed), (1, 0));
    assert_consistent(&service).await;

    service.delete(moved.id, false).await.unwrap();
    assert!(!env.root().join("march.txt").exists());
    assert_consistent(&service).await;

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.total_size, b"added by hand".len() as i64);
}

#[tokio::test]
async fn test_escape_attempts_leave_no_trace() {
    let env = TestEnv::new().await;
    let service = FileService::new(&env.db, &env.storage);

    for path in ["..", "../x", "a/../../b", "..\\..\\windows"] {
        let result = service
            .upload(&UploadRequest::new("x.txt", b"x".to_vec()).with_path(path))
            .await;
        assert!(
            matches!(result, Err(FilekeepError::PathEscape(_))),
            "{path} was accepted"
        );
    }

    assert!(service.list().await.unwrap().is_empty());
    assert!(env.storage.scan().unwrap().is_empty());
    let parent = env.temp_dir.path().parent().unwrap();
    assert!(!parent.join("x.txt").exists());
    assert!(!parent.join("x").exists());
}

#[tokio::test]
async fn test_reopened_database_keeps_records() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("meta").join("filekeep.db");
    let storage = filekeep::FileStorage::new(temp_dir.path().join("files")).unwrap();

    let id = {
        let db = filekeep::Database::open(&db_path, 2).await.unwrap();
        let service = FileService::new(&db, &storage);
        let file = service
            .upload(&UploadRequest::new("keep.md", b"# keep".to_vec()))
            .await
            .unwrap();
        db.close().await;
        file.id
    };

    let db = filekeep::Database::open(&db_path, 2).await.unwrap();
    let service = FileService::new(&db, &storage);
    let file = service.get(id).await.unwrap();
    assert_eq!(file.file_name(), "keep.md");
    assert_eq!(service.sync().await.unwrap(), Default::default());
}
