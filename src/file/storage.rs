//! Physical file storage for filekeep.
//!
//! Files are kept under a single storage root, laid out exactly as the
//! metadata describes them:
//! ```text
//! {base_path}/
//! ├── report.txt             (path = "")
//! └── docs/
//!     └── 2024/
//!         └── budget.xlsx    (path = "docs/2024")
//! ```
//! Names coming from users are sanitized through [`crate::file::sanitize`];
//! names already on record are located with
//! [`resolve_stored`](crate::file::sanitize::resolve_stored).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::sanitize::{
    resolve_dir, resolve_stored, sanitize_extension, sanitize_segment, split_extension,
};
use crate::{FilekeepError, Result};

/// Identity of a stored file: `(name, extension, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    /// Name without extension.
    pub name: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    /// Directory relative to the storage root, `""` for the root itself.
    pub path: String,
}

impl FileKey {
    /// Create a key from its parts.
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            path: path.into(),
        }
    }

    /// The on-disk filename (`name` + `extension`).
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    /// Check that a scan of the stored file yields this same key.
    ///
    /// Names made only of dots, and extensions that would merge into the
    /// name, are rejected with [`FilekeepError::Validation`].
    pub fn ensure_scannable(&self) -> Result<()> {
        let file_name = self.file_name();
        let dots_only = self.name.chars().all(|c| c == '.');
        let read_back = split_extension(&file_name);
        if dots_only || read_back != (self.name.as_str(), self.extension.as_str()) {
            return Err(FilekeepError::Validation(format!(
                "file name {file_name:?} is not usable"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.file_name())
        } else {
            write!(f, "{}/{}", self.path, self.file_name())
        }
    }
}

/// Incoming file content together with the filename the client reported.
pub trait UploadSource {
    /// Filename as sent by the client; only used when no name is given.
    fn original_filename(&self) -> &str;

    /// Number of bytes the source will write.
    fn size_hint(&self) -> u64;

    /// Write the whole content to `path`, creating or truncating it.
    fn write_to(&self, path: &Path) -> io::Result<()>;
}

/// An upload fully buffered in memory (a multipart field, a test fixture).
#[derive(Debug, Clone)]
pub struct MemoryUpload {
    pub original_filename: String,
    pub content: Vec<u8>,
}

impl MemoryUpload {
    pub fn new(original_filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            original_filename: original_filename.into(),
            content: content.into(),
        }
    }
}

impl UploadSource for MemoryUpload {
    fn original_filename(&self) -> &str {
        &self.original_filename
    }

    fn size_hint(&self) -> u64 {
        self.content.len() as u64
    }

    fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.content)
    }
}

/// Result of saving (or planning to save) an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: FileKey,
    /// Size in bytes. For a plan this is the source's size hint.
    pub size: i64,
}

/// A regular file found by [`FileStorage::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub key: FileKey,
    pub size: i64,
    pub modified_at: DateTime<Utc>,
}

/// File storage service for managing physical files under one root.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Canonicalized storage root.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| FilekeepError::from_io(e, &base_path))?;
        let base_path =
            fs::canonicalize(&base_path).map_err(|e| FilekeepError::from_io(e, &base_path))?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Work out where an upload would land, without touching the disk.
    ///
    /// The name comes from `desired_name` when it has a non-empty stem and
    /// from the source's original filename otherwise. The extension follows
    /// the same precedence: an extension typed by the user wins over the one
    /// the uploaded file carried.
    pub fn plan(
        &self,
        source: &dyn UploadSource,
        desired_name: &str,
        desired_path: &str,
    ) -> Result<StoredFile> {
        let original = source.original_filename().trim();
        let original = original.rsplit(['/', '\\']).next().unwrap_or(original);
        let (original_stem, original_ext) = split_extension(original);
        let (user_stem, user_ext) = split_extension(desired_name.trim());

        let stem = if user_stem.is_empty() {
            original_stem
        } else {
            user_stem
        };
        let name = sanitize_segment(stem);
        if name.is_empty() {
            return Err(FilekeepError::Validation(format!(
                "file name {stem:?} is empty after sanitization"
            )));
        }

        let extension = sanitize_extension(if user_ext.is_empty() {
            original_ext
        } else {
            user_ext
        });
        let path = self.relative_dir(desired_path)?;

        let key = FileKey {
            name,
            extension,
            path,
        };
        key.ensure_scannable()?;
        resolve_stored(&self.base_path, &key.path, &key.file_name())?;

        Ok(StoredFile {
            key,
            size: source.size_hint() as i64,
        })
    }

    /// Save an upload under the planned name and directory.
    ///
    /// Parent directories are created as needed. The returned size is the
    /// one observed on disk after the write. If the write fails, whatever
    /// was partially written is removed before the error is returned.
    pub fn save(
        &self,
        source: &dyn UploadSource,
        desired_name: &str,
        desired_path: &str,
    ) -> Result<StoredFile> {
        let planned = self.plan(source, desired_name, desired_path)?;
        let target = self.absolute_path(&planned.key)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FilekeepError::from_io(e, parent))?;
        }

        if let Err(e) = source.write_to(&target) {
            if let Err(cleanup) = fs::remove_file(&target) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %target.display(),
                        error = %cleanup,
                        "Failed to remove partially written file"
                    );
                }
            }
            return Err(FilekeepError::from_io(e, &target));
        }

        let size = fs::metadata(&target)
            .map_err(|e| FilekeepError::from_io(e, &target))?
            .len();

        tracing::info!(file = %planned.key, size, "Saved file");

        Ok(StoredFile {
            key: planned.key,
            size: size as i64,
        })
    }

    /// Rename and/or move a stored file.
    ///
    /// `new_name` must already be sanitized (or be the current, recorded
    /// name). `new_path` is treated as user input unless it equals the
    /// current path verbatim. When neither changes, nothing on disk is
    /// touched. Returns the relative path the file now lives in.
    ///
    /// An existing file at the target fails with
    /// [`FilekeepError::Duplicate`]; files are never overwritten.
    pub fn move_file(&self, current: &FileKey, new_name: &str, new_path: &str) -> Result<String> {
        let new_rel = if new_path == current.path {
            current.path.clone()
        } else {
            self.relative_dir(new_path)?
        };

        if new_rel == current.path && new_name == current.name {
            tracing::debug!(file = %current, "Move is a no-op");
            return Ok(new_rel);
        }

        let source = self.absolute_path(current)?;
        let target = resolve_stored(
            &self.base_path,
            &new_rel,
            &format!("{new_name}{}", current.extension),
        )?;

        if target.exists() {
            return Err(FilekeepError::Duplicate(
                FileKey::new(new_name, current.extension.as_str(), new_rel.as_str()).to_string(),
            ));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FilekeepError::from_io(e, parent))?;
        }
        fs::rename(&source, &target).map_err(|e| FilekeepError::from_io(e, &source))?;

        tracing::info!(
            from = %source.display(),
            to = %target.display(),
            "Moved file"
        );

        Ok(new_rel)
    }

    /// Delete a stored file.
    ///
    /// A missing file is fine when `silent_if_missing` is set and
    /// [`FilekeepError::NotFound`] otherwise.
    pub fn delete(&self, key: &FileKey, silent_if_missing: bool) -> Result<bool> {
        let file_path = self.absolute_path(key)?;

        match fs::remove_file(&file_path) {
            Ok(()) => {
                tracing::info!(file = %key, "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if silent_if_missing {
                    tracing::debug!(file = %key, "File already gone");
                    Ok(true)
                } else {
                    Err(FilekeepError::NotFound(format!(
                        "File {}",
                        file_path.display()
                    )))
                }
            }
            Err(e) => Err(FilekeepError::from_io(e, &file_path)),
        }
    }

    /// Walk the storage root and list every regular file.
    ///
    /// Symbolic links are neither followed nor reported. Entries are
    /// returned in a stable, filename-sorted order.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.base_path)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| self.walk_error(e))?;
            let file_name = entry.file_name().to_string_lossy();
            let (name, extension) = split_extension(&file_name);
            let dir = entry.path().parent().unwrap_or(&self.base_path);
            let path = dir
                .strip_prefix(&self.base_path)
                .map(join_relative)
                .unwrap_or_default();
            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .map_err(|e| FilekeepError::from_io(e, entry.path()))?;

            files.push(ScannedFile {
                key: FileKey::new(name, extension, path),
                size: metadata.len() as i64,
                modified_at,
            });
        }

        tracing::debug!(count = files.len(), "Scanned storage");
        Ok(files)
    }

    /// Absolute path of a recorded file. Does not check that it exists.
    pub fn absolute_path(&self, key: &FileKey) -> Result<PathBuf> {
        resolve_stored(&self.base_path, &key.path, &key.file_name())
    }

    /// Check if a regular file exists for the key.
    pub fn exists(&self, key: &FileKey) -> bool {
        self.absolute_path(key)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Normalize a user-supplied directory into its stored form.
    ///
    /// Sanitizes each segment, resolves `..` against the preceding ones and
    /// fails with [`FilekeepError::PathEscape`] if the result leaves the root.
    pub fn relative_dir(&self, raw: &str) -> Result<String> {
        let dir = resolve_dir(&self.base_path, raw)?;
        let relative = dir
            .strip_prefix(&self.base_path)
            .map_err(|_| FilekeepError::PathEscape(raw.to_string()))?;
        Ok(join_relative(relative))
    }

    /// Remove empty subdirectories, deepest first.
    ///
    /// The storage root itself is never removed.
    pub fn cleanup_empty_dirs(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in WalkDir::new(&self.base_path)
            .min_depth(1)
            .follow_links(false)
            .contents_first(true)
        {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let is_empty = fs::read_dir(path)
                .map_err(|e| FilekeepError::from_io(e, path))?
                .next()
                .is_none();
            if is_empty {
                fs::remove_dir(path).map_err(|e| FilekeepError::from_io(e, path))?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Removed empty directories");
        }
        Ok(removed)
    }

    fn walk_error(&self, err: walkdir::Error) -> FilekeepError {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_path.clone());
        FilekeepError::from_io(err.into(), &path)
    }
}

/// Join the normal components of a relative path with the native separator.
fn join_relative(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(MAIN_SEPARATOR_STR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn sep(parts: &[&str]) -> String {
        parts.join(MAIN_SEPARATOR_STR)
    }

    struct FailingUpload;

    impl UploadSource for FailingUpload {
        fn original_filename(&self) -> &str {
            "broken.bin"
        }

        fn size_hint(&self) -> u64 {
            100
        }

        fn write_to(&self, path: &Path) -> io::Result<()> {
            fs::write(path, b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_file_key_ensure_scannable() {
        assert!(FileKey::new("report", ".txt", "").ensure_scannable().is_ok());
        assert!(FileKey::new(".bashrc", "", "").ensure_scannable().is_ok());
        assert!(FileKey::new(".hidden", ".txt", "a").ensure_scannable().is_ok());
        assert!(FileKey::new("v1.2.tar", ".gz", "").ensure_scannable().is_ok());

        for key in [
            FileKey::new(".", "", ""),
            FileKey::new("..", ".txt", ""),
            FileKey::new("...", ".md", "docs"),
            FileKey::new("report", ".tar.gz", ""),
        ] {
            assert!(
                matches!(key.ensure_scannable(), Err(FilekeepError::Validation(_))),
                "{key} was accepted"
            );
        }
    }

    #[test]
    fn test_plan_rejects_dot_only_name() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("a.txt", b"a".to_vec());

        let result = storage.plan(&source, "..", "");
        assert!(matches!(result, Err(FilekeepError::Validation(_))));
    }

    #[test]
    fn test_new_creates_and_canonicalizes_root() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("storage");
        let storage = FileStorage::new(&base).unwrap();

        assert!(base.is_dir());
        assert_eq!(storage.base_path(), fs::canonicalize(&base).unwrap());
    }

    #[test]
    fn test_plan_uses_desired_name_and_original_extension() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("scan 0001.PDF", b"pdf".to_vec());

        let planned = storage.plan(&source, "Отчет за март", "docs").unwrap();
        assert_eq!(planned.key.name, "Otchet_za_mart");
        assert_eq!(planned.key.extension, ".PDF");
        assert_eq!(planned.key.path, "docs");
        assert_eq!(planned.size, 3);
    }

    #[test]
    fn test_plan_user_extension_wins() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("data.csv", Vec::new());

        let planned = storage.plan(&source, "export.txt", "").unwrap();
        assert_eq!(planned.key.name, "export");
        assert_eq!(planned.key.extension, ".txt");
    }

    #[test]
    fn test_plan_falls_back_to_original_name() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("C:\\Users\\me\\photo.jpg", Vec::new());

        let planned = storage.plan(&source, "  ", "").unwrap();
        assert_eq!(planned.key, FileKey::new("photo", ".jpg", ""));
    }

    #[test]
    fn test_plan_rejects_empty_name() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("!!!.txt", Vec::new());

        let result = storage.plan(&source, "", "");
        assert!(matches!(result, Err(FilekeepError::Validation(_))));
    }

    #[test]
    fn test_plan_resolves_parent_segments() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("a.txt", Vec::new());

        let planned = storage.plan(&source, "", "docs/../img/./2024").unwrap();
        assert_eq!(planned.key.path, sep(&["img", "2024"]));
    }

    #[test]
    fn test_save_writes_file() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("report.txt", b"Hello, World!".to_vec());

        let stored = storage.save(&source, "", "docs/2024").unwrap();
        assert_eq!(stored.key, FileKey::new("report", ".txt", sep(&["docs", "2024"])));
        assert_eq!(stored.size, 13);

        let on_disk = storage
            .base_path()
            .join("docs")
            .join("2024")
            .join("report.txt");
        assert_eq!(fs::read(on_disk).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_save_to_root_aliases() {
        let (storage, _temp) = create_test_storage();

        for (i, alias) in ["", ".", "/", "\\"].iter().enumerate() {
            let source = MemoryUpload::new(format!("f{i}.txt"), b"x".to_vec());
            let stored = storage.save(&source, "", alias).unwrap();
            assert_eq!(stored.key.path, "");
            assert!(storage.base_path().join(format!("f{i}.txt")).is_file());
        }
    }

    #[test]
    fn test_save_rejects_escape() {
        let (storage, temp) = create_test_storage();
        let source = MemoryUpload::new("evil.txt", b"x".to_vec());

        let result = storage.save(&source, "", "../../etc");
        assert!(matches!(result, Err(FilekeepError::PathEscape(_))));
        assert!(!temp.path().parent().unwrap().join("etc").join("evil.txt").exists());
    }

    #[test]
    fn test_save_rejects_dotdot_name() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("x", b"x".to_vec());

        let result = storage.save(&source, "..", "");
        assert!(matches!(result, Err(FilekeepError::PathEscape(_))));
    }

    #[test]
    fn test_save_removes_partial_file_on_failure() {
        let (storage, _temp) = create_test_storage();

        let result = storage.save(&FailingUpload, "", "");
        assert!(matches!(result, Err(FilekeepError::Io(_))));
        assert!(!storage.base_path().join("broken.bin").exists());
    }

    #[test]
    fn test_move_file() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("a.txt", b"content".to_vec());
        let stored = storage.save(&source, "", "").unwrap();

        let new_path = storage.move_file(&stored.key, "b", "archive/old").unwrap();
        assert_eq!(new_path, sep(&["archive", "old"]));

        let moved = FileKey::new("b", ".txt", new_path);
        assert!(storage.exists(&moved));
        assert!(!storage.exists(&stored.key));
    }

    #[test]
    fn test_move_file_noop() {
        let (storage, _temp) = create_test_storage();
        let source = MemoryUpload::new("a.txt", b"content".to_vec());
        let stored = storage.save(&source, "", "docs").unwrap();

        let path = storage.move_file(&stored.key, "a", "docs").unwrap();
        assert_eq!(path, "docs");
        assert!(storage.exists(&stored.key));
    }

    #[test]
    fn test_move_file_noop_on_missing_file() {
        let (storage, _temp) = create_test_storage();
        let ghost = FileKey::new("ghost", ".txt", "");

        // No filesystem call is made, so the missing source is not noticed.
        assert_eq!(storage.move_file(&ghost, "ghost", "").unwrap(), "");
    }

    #[test]
    fn test_move_file_refuses_overwrite() {
        let (storage, _temp) = create_test_storage();
        let a = storage.save(&MemoryUpload::new("a.txt", b"a".to_vec()), "", "").unwrap();
        let b = storage.save(&MemoryUpload::new("b.txt", b"b".to_vec()), "", "").unwrap();

        let result = storage.move_file(&a.key, "b", "");
        assert!(matches!(result, Err(FilekeepError::Duplicate(_))));

        let b_path = storage.absolute_path(&b.key).unwrap();
        assert_eq!(fs::read(b_path).unwrap(), b"b");
        assert!(storage.exists(&a.key));
    }

    #[test]
    fn test_move_file_missing_source() {
        let (storage, _temp) = create_test_storage();
        let ghost = FileKey::new("ghost", ".txt", "");

        let result = storage.move_file(&ghost, "renamed", "");
        assert!(matches!(result, Err(FilekeepError::Io(_))));
    }

    #[test]
    fn test_move_file_rejects_escape() {
        let (storage, _temp) = create_test_storage();
        let stored = storage.save(&MemoryUpload::new("a.txt", b"a".to_vec()), "", "").unwrap();

        let result = storage.move_file(&stored.key, "a", "../outside");
        assert!(matches!(result, Err(FilekeepError::PathEscape(_))));
        assert!(storage.exists(&stored.key));
    }

    #[test]
    fn test_delete() {
        let (storage, _temp) = create_test_storage();
        let stored = storage.save(&MemoryUpload::new("a.txt", b"a".to_vec()), "", "").unwrap();

        assert!(storage.delete(&stored.key, false).unwrap());
        assert!(!storage.exists(&stored.key));
    }

    #[test]
    fn test_delete_missing_file() {
        let (storage, _temp) = create_test_storage();
        let ghost = FileKey::new("ghost", ".txt", "");

        assert!(storage.delete(&ghost, true).unwrap());
        assert!(matches!(
            storage.delete(&ghost, false),
            Err(FilekeepError::NotFound(_))
        ));
    }

    #[test]
    fn test_scan() {
        let (storage, _temp) = create_test_storage();
        let base = storage.base_path().to_path_buf();
        fs::create_dir_all(base.join("docs").join("2024")).unwrap();
        fs::create_dir_all(base.join("empty")).unwrap();
        fs::write(base.join("top.txt"), b"12345").unwrap();
        fs::write(base.join("docs").join("2024").join("budget.xlsx"), b"xx").unwrap();
        fs::write(base.join("docs").join(".bashrc"), b"").unwrap();
        fs::write(base.join("docs").join("archive.tar.gz"), b"gz").unwrap();

        let mut found: Vec<(FileKey, i64)> = storage
            .scan()
            .unwrap()
            .into_iter()
            .map(|f| (f.key, f.size))
            .collect();
        found.sort_by_key(|(key, _)| key.to_string());

        let mut expected = vec![
            (FileKey::new(".bashrc", "", "docs"), 0),
            (FileKey::new("budget", ".xlsx", sep(&["docs", "2024"])), 2),
            (FileKey::new("archive.tar", ".gz", "docs"), 2),
            (FileKey::new("top", ".txt", ""), 5),
        ];
        expected.sort_by_key(|(key, _)| key.to_string());

        assert_eq!(found, expected);
    }

    #[test]
    fn test_scan_empty_storage() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.scan().unwrap().is_empty());
    }

    #[test]
    fn test_absolute_path_keeps_recorded_names() {
        let (storage, _temp) = create_test_storage();
        let key = FileKey::new("мой файл", ".txt", "Мои документы");

        let path = storage.absolute_path(&key).unwrap();
        assert_eq!(
            path,
            storage.base_path().join("Мои документы").join("мой файл.txt")
        );
    }

    #[test]
    fn test_relative_dir() {
        let (storage, _temp) = create_test_storage();

        assert_eq!(storage.relative_dir("/").unwrap(), "");
        assert_eq!(storage.relative_dir("a\\b").unwrap(), sep(&["a", "b"]));
        assert!(matches!(
            storage.relative_dir(".."),
            Err(FilekeepError::PathEscape(_))
        ));
    }

    #[test]
    fn test_cleanup_empty_dirs() {
        let (storage, _temp) = create_test_storage();
        let base = storage.base_path().to_path_buf();
        fs::create_dir_all(base.join("a").join("b").join("c")).unwrap();
        fs::create_dir_all(base.join("keep")).unwrap();
        fs::write(base.join("keep").join("file.txt"), b"x").unwrap();

        let removed = storage.cleanup_empty_dirs().unwrap();
        assert_eq!(removed, 3);
        assert!(!base.join("a").exists());
        assert!(base.join("keep").join("file.txt").exists());
        assert!(base.exists());
    }
}
