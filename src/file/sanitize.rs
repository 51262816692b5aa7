//! Path sanitization for filekeep.
//!
//! User input is the only source of path data. Every filesystem path built
//! from a user-supplied name or directory goes through [`resolve_safe`] or
//! [`resolve_dir`], which guarantee the result stays inside the storage root.

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

use crate::{FilekeepError, Result};

/// Characters kept verbatim by [`sanitize_segment`].
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Turn an arbitrary string into a filesystem-safe ASCII name.
///
/// Non-ASCII text is transliterated (`отчет` becomes `otchet`), every run of
/// characters other than ASCII letters, digits, `_`, `-` and `.` collapses to
/// a single `_`, and leading/trailing underscores are stripped.
///
/// The function is idempotent.
pub fn sanitize_segment(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw);
    let mut out = String::with_capacity(ascii.len());
    let mut in_run = false;

    for c in ascii.chars() {
        if is_allowed(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out.trim_matches('_').to_string()
}

/// Sanitize a relative directory path segment by segment.
///
/// Both `/` and `\` separate segments. Empty segments, and segments that
/// sanitize to nothing or to `.`, are dropped; the rest are joined with the
/// platform separator. Any spelling of the storage root yields `""`.
///
/// `..` segments survive sanitization on purpose: [`resolve_safe`] is the
/// place where they are rejected.
pub fn sanitize_path(raw: &str) -> String {
    let segments: Vec<String> = raw
        .trim()
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(sanitize_segment)
        .filter(|s| !s.is_empty() && s != ".")
        .collect();

    segments.join(MAIN_SEPARATOR_STR)
}

/// Check whether the input is one of the spellings of the storage root.
pub fn is_root_alias(raw: &str) -> bool {
    matches!(raw.trim(), "" | "." | "/" | "\\")
}

/// Split a filename into stem and extension.
///
/// Only the part after the last separator is searched for a dot.
/// The extension keeps its leading dot. Leading dots never start an
/// extension, so `.bashrc` has none; only the last dot counts, so
/// `archive.tar.gz` splits into `archive.tar` and `.gz`.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let tail = &filename[start..];
    match tail.rfind('.') {
        Some(idx) if tail[..idx].chars().any(|c| c != '.') => {
            let at = start + idx;
            (&filename[..at], &filename[at..])
        }
        _ => (filename, ""),
    }
}

/// Sanitize the extension body, keeping the leading dot.
pub fn sanitize_extension(extension: &str) -> String {
    match extension.strip_prefix('.') {
        Some(body) => format!(".{}", sanitize_segment(body)),
        None if extension.is_empty() => String::new(),
        None => format!(".{}", sanitize_segment(extension)),
    }
}

/// Strip any directory part from a user-supplied filename.
fn base_name(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// Join `relative_path` and `filename` under `base` without sanitizing them.
///
/// Used for names that are already on record (uploaded earlier or picked up
/// by a scan), which may legitimately contain characters [`sanitize_segment`]
/// would rewrite. The containment guarantee is the same as [`resolve_safe`]:
/// `..` segments, separators inside `filename`, and results outside `base`
/// are rejected with [`FilekeepError::PathEscape`].
pub fn resolve_stored(base: &Path, relative_path: &str, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() || filename == "." || filename == ".." || filename.contains(['/', '\\'])
    {
        return Err(FilekeepError::PathEscape(filename.to_string()));
    }

    let root = normalize(base);
    let mut resolved = root.clone();
    for segment in relative_path.split(['/', '\\']).filter(|s| !s.is_empty()) {
        match segment {
            "." => {}
            ".." => return Err(FilekeepError::PathEscape(relative_path.to_string())),
            other => resolved.push(other),
        }
    }
    resolved.push(filename);

    if !resolved.starts_with(&root) {
        return Err(FilekeepError::PathEscape(format!(
            "{relative_path}/{filename}"
        )));
    }

    Ok(resolved)
}

/// Remove `.` components and resolve `..` against what precedes them.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a user-supplied relative directory under `base`.
///
/// Fails with [`FilekeepError::PathEscape`] if any `..` would climb above
/// `base`, or if the normalized result is not inside the normalized base.
pub fn resolve_dir(base: &Path, relative_path: &str) -> Result<PathBuf> {
    let root = normalize(base);
    let cleaned = sanitize_path(relative_path);

    let mut resolved = root.clone();
    let mut depth = 0usize;
    for component in Path::new(&cleaned).components() {
        match component {
            Component::Normal(segment) => {
                resolved.push(segment);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => {
                resolved.pop();
                depth -= 1;
            }
            _ => {
                tracing::warn!(path = %relative_path, "Rejected path outside storage root");
                return Err(FilekeepError::PathEscape(relative_path.to_string()));
            }
        }
    }

    if !resolved.starts_with(&root) {
        tracing::warn!(path = %relative_path, "Rejected path outside storage root");
        return Err(FilekeepError::PathEscape(relative_path.to_string()));
    }

    Ok(resolved)
}

/// Resolve `(base, relative_path, filename)` into an absolute file path.
///
/// Any directory component of `filename` is discarded before sanitizing, so
/// the filename field can never be used for traversal. The result is checked
/// after normalization and is guaranteed to lie strictly inside `base`.
pub fn resolve_safe(base: &Path, relative_path: &str, filename: &str) -> Result<PathBuf> {
    let cleaned_name = sanitize_segment(base_name(filename));
    if cleaned_name.is_empty() || cleaned_name == "." || cleaned_name == ".." {
        tracing::warn!(filename = %filename, "Rejected unusable filename");
        return Err(FilekeepError::PathEscape(filename.to_string()));
    }

    let dir = resolve_dir(base, relative_path)?;
    let full = normalize(&dir.join(&cleaned_name));

    let root = normalize(base);
    if !full.starts_with(&root) || full == root {
        return Err(FilekeepError::PathEscape(format!(
            "{relative_path}/{filename}"
        )));
    }

    Ok(full)
}
