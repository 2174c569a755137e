//! Filesystem-based binary object storage implementation.
//!
//! This backend writes each payload to a file under a base directory and keeps
//! its metadata in a sibling properties file.

use crate::path::{metadata_path, resolve, upload_path};
use crate::{BinaryObject, BinaryObjectMetadata, BinaryObjectStorage, Payload, metadata_file};
use biob_error::{StorageError, StorageErrorKind, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Chunk size used when streaming a payload to disk.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Filesystem storage backend.
///
/// A storage path `p` maps to `{base_path}/p` for the payload and
/// `{base_path}/p-metadata.properties` for the metadata.
///
/// # Example Structure
///
/// ```text
/// /var/biob/
/// └── 1/
///     └── images/
///         ├── 6f9619ff-8b86-d011-b42d-00c04fc964ff
///         └── 6f9619ff-8b86-d011-b42d-00c04fc964ff-metadata.properties
/// ```
///
/// # Consistency
///
/// `store` streams the payload and writes the metadata into uniquely named
/// `.biob-upload` siblings, and only then renames them over the object. If the
/// incoming stream or either write fails, the uploads are removed and any
/// previous object at the path is left intact.
///
/// The two renames are not atomic as a pair. The old metadata is removed
/// first, so a crash between them leaves a payload without metadata, which
/// [`BinaryObjectStorage::retrieve`] reports as
/// [`StorageErrorKind::InconsistentState`] and
/// [`BinaryObjectStorage::has_binary_object`] reports as absent.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Root directory for stored objects
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Whether a regular file exists at `path`. Directories do not count as objects.
    async fn is_file(path: &Path) -> StorageResult<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }

    /// Load the metadata of a payload known to exist.
    async fn load_metadata(payload_path: &Path) -> StorageResult<BinaryObjectMetadata> {
        let path = metadata_path(payload_path);

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::InconsistentState(format!(
                    "{} has no metadata file {}",
                    payload_path.display(),
                    path.display()
                )))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let decode_error = |reason: String| {
            StorageError::new(StorageErrorKind::MetadataDecode(format!(
                "{}: {}",
                path.display(),
                reason
            )))
        };
        let contents = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;
        metadata_file::decode(&contents).map_err(decode_error)
    }

    /// Drain `payload` into a fresh file at `upload`.
    ///
    /// Failures of the incoming stream are [`StorageErrorKind::PayloadRead`];
    /// failures of the file are [`StorageErrorKind::FileWrite`].
    async fn write_upload(upload: &Path, payload: &mut Payload) -> StorageResult<u64> {
        let mut file = tokio::fs::File::create(upload)
            .await
            .map_err(|e| write_error(upload, e))?;

        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut size = 0u64;
        loop {
            let read = payload.read(&mut buffer).await.map_err(|e| {
                StorageError::new(StorageErrorKind::PayloadRead(format!(
                    "{}: {}",
                    upload.display(),
                    e
                )))
            })?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .await
                .map_err(|e| write_error(upload, e))?;
            size += read as u64;
        }

        file.flush().await.map_err(|e| write_error(upload, e))?;
        Ok(size)
    }

    /// Move finished uploads over the object's payload and metadata.
    async fn commit(
        upload: &Path,
        target: &Path,
        metadata_upload: &Path,
        metadata_target: &Path,
    ) -> StorageResult<()> {
        // Old metadata goes first: an interrupted commit leaves an orphaned
        // payload, never a new payload paired with stale metadata.
        Self::remove_tree(metadata_target).await?;
        tokio::fs::rename(upload, target)
            .await
            .map_err(|e| write_error(target, e))?;
        tokio::fs::rename(metadata_upload, metadata_target)
            .await
            .map_err(|e| write_error(metadata_target, e))
    }

    /// Best-effort removal of an in-flight file after a failed store.
    async fn discard(upload: &Path) {
        match tokio::fs::remove_file(upload).await {
            Ok(()) => {}
            Err(e) if is_absent(&e) => {}
            Err(e) => {
                tracing::warn!(location = %upload.display(), error = %e, "Failed to remove upload file");
            }
        }
    }

    /// Remove a file or directory tree, treating absence as success.
    ///
    /// Returns whether anything was removed.
    async fn remove_tree(path: &Path) -> StorageResult<bool> {
        let delete_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::FileDelete(format!(
                "{}: {}",
                path.display(),
                e
            )))
        };

        let file_type = match tokio::fs::symlink_metadata(path).await {
            Ok(meta) => meta.file_type(),
            Err(e) if is_absent(&e) => return Ok(false),
            Err(e) => return Err(delete_error(e)),
        };

        let removed = if file_type.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        match removed {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(delete_error(e)),
        }
    }
}

fn write_error(target: &Path, e: std::io::Error) -> StorageError {
    StorageError::new(StorageErrorKind::FileWrite(format!(
        "{}: {}",
        target.display(),
        e
    )))
}

/// Errors meaning nothing exists at the path, including a file where a parent directory is expected.
fn is_absent(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

#[async_trait::async_trait]
impl BinaryObjectStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, path, metadata, payload), fields(path = %path, content_type = %metadata.content_type()))]
    async fn store(
        &self,
        path: &str,
        metadata: &BinaryObjectMetadata,
        mut payload: Payload,
    ) -> StorageResult<()> {
        let target = resolve(&self.base_path, path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let upload = upload_path(&target);
        let size = match Self::write_upload(&upload, &mut payload).await {
            Ok(size) => size,
            Err(e) => {
                Self::discard(&upload).await;
                return Err(e);
            }
        };
        drop(payload);

        let metadata_target = metadata_path(&target);
        let metadata_upload = upload_path(&metadata_target);
        if let Err(e) = tokio::fs::write(&metadata_upload, metadata_file::encode(metadata)).await {
            Self::discard(&upload).await;
            Self::discard(&metadata_upload).await;
            return Err(write_error(&metadata_upload, e));
        }

        if let Err(e) = Self::commit(&upload, &target, &metadata_upload, &metadata_target).await {
            Self::discard(&upload).await;
            Self::discard(&metadata_upload).await;
            return Err(e);
        }

        tracing::info!(
            location = %target.display(),
            size,
            "Stored binary object"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn retrieve(&self, path: &str) -> StorageResult<Option<BinaryObject>> {
        let target = resolve(&self.base_path, path)?;

        if !Self::is_file(&target).await? {
            tracing::debug!("Binary object not found");
            return Ok(None);
        }

        let metadata = Self::load_metadata(&target).await?;
        let file = tokio::fs::File::open(&target).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                target.display(),
                e
            )))
        })?;

        tracing::debug!(location = %target.display(), "Retrieved binary object");
        Ok(Some(BinaryObject::new(file, metadata)))
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn get_metadata(&self, path: &str) -> StorageResult<Option<BinaryObjectMetadata>> {
        let target = resolve(&self.base_path, path)?;

        if !Self::is_file(&target).await? {
            return Ok(None);
        }

        Self::load_metadata(&target).await.map(Some)
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn has_binary_object(&self, path: &str) -> StorageResult<bool> {
        let target = resolve(&self.base_path, path)?;

        Ok(Self::is_file(&target).await? && Self::is_file(&metadata_path(&target)).await?)
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn delete(&self, path: &str) -> StorageResult<()> {
        let target = resolve(&self.base_path, path)?;

        let removed_payload = Self::remove_tree(&target).await?;
        let removed_metadata = Self::remove_tree(&metadata_path(&target)).await?;

        if removed_payload || removed_metadata {
            tracing::info!(location = %target.display(), "Deleted binary object");
        } else {
            tracing::debug!("Nothing stored, delete is a no-op");
        }
        Ok(())
    }
}
