//! Storage key normalisation and filesystem resolution.
//!
//! Every backend runs a key through [`normalize_key`] before touching its
//! state, so `"images/1"`, `"./images//1"` and `"images/1/"` name the same
//! object everywhere and the same keys are rejected everywhere.

use biob_error::{StorageError, StorageErrorKind, StorageResult};
use std::path::{Path, PathBuf};

/// Suffix appended to a payload's file name to name its metadata sibling.
pub const METADATA_SUFFIX: &str = "-metadata.properties";

/// Suffix of in-flight files written while a store is in progress.
pub(crate) const UPLOAD_SUFFIX: &str = ".biob-upload";

fn invalid(path: &str, reason: &str) -> StorageError {
    StorageError::new(StorageErrorKind::InvalidPath(format!("{:?}: {}", path, reason)))
}

/// Canonical form of a storage key.
///
/// Segments are separated by `/`. Empty and `.` segments are dropped. Keys
/// that are absolute, contain `..`, name nothing, or end in a reserved file
/// name are rejected with [`StorageErrorKind::InvalidPath`].
pub(crate) fn normalize_key(path: &str) -> StorageResult<String> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(invalid(path, "absolute keys are not allowed"));
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(invalid(path, "parent segments are not allowed")),
            _ if segment.contains(['\\', '\0']) => {
                return Err(invalid(path, "segments must not contain '\\' or NUL"));
            }
            _ => segments.push(segment),
        }
    }

    let Some(last) = segments.last() else {
        return Err(invalid(path, "does not name an object"));
    };
    if last.ends_with(METADATA_SUFFIX) || last.ends_with(UPLOAD_SUFFIX) {
        return Err(invalid(path, "names a reserved file"));
    }

    Ok(segments.join("/"))
}

/// Resolve a storage key to a location under `base`.
pub(crate) fn resolve(base: &Path, path: &str) -> StorageResult<PathBuf> {
    let key = normalize_key(path)?;
    Ok(key.split('/').fold(base.to_path_buf(), |resolved, segment| {
        resolved.join(segment)
    }))
}

/// Location of the metadata file belonging to a payload file.
pub(crate) fn metadata_path(payload_path: &Path) -> PathBuf {
    sibling(payload_path, METADATA_SUFFIX)
}

/// Unique in-flight location next to `target`, used until a store commits.
pub(crate) fn upload_path(target: &Path) -> PathBuf {
    sibling(target, &format!(".{}{}", uuid::Uuid::new_v4().simple(), UPLOAD_SUFFIX))
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
