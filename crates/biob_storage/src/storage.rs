//! Storage trait definition.

use crate::{BinaryObject, BinaryObjectMetadata, Payload};
use biob_error::StorageResult;

/// Trait for pluggable binary object storage backends.
///
/// Objects are addressed by a slash-separated relative path such as
/// `"1/images/3f2c..."`. Backends treat the path as an opaque key and never
/// interpret its segments.
///
/// Not-found is not an error: lookups return `None` or `false`, and deleting a
/// missing object succeeds.
#[async_trait::async_trait]
pub trait BinaryObjectStorage: Send + Sync {
    /// Store a payload and its metadata under `path`.
    ///
    /// Any object already stored at `path` is replaced. The payload stream is
    /// drained and released before this returns, whether or not the store
    /// succeeds.
    ///
    /// # Arguments
    ///
    /// * `path` - Key of the object
    /// * `metadata` - Size, original filename and content type of the payload
    /// * `payload` - Stream of payload bytes
    ///
    /// # Errors
    ///
    /// Returns error if the path is invalid or the backend cannot accept the write.
    async fn store(
        &self,
        path: &str,
        metadata: &BinaryObjectMetadata,
        payload: Payload,
    ) -> StorageResult<()>;

    /// Retrieve the object stored under `path`.
    ///
    /// # Returns
    ///
    /// `Some(object)` with a fresh payload stream owned by the caller, or `None`
    /// if nothing is stored at `path`.
    async fn retrieve(&self, path: &str) -> StorageResult<Option<BinaryObject>>;

    /// Get the metadata of the object stored under `path` without opening its payload.
    async fn get_metadata(&self, path: &str) -> StorageResult<Option<BinaryObjectMetadata>>;

    /// Check whether an object is stored under `path`.
    async fn has_binary_object(&self, path: &str) -> StorageResult<bool>;

    /// Delete the payload and metadata stored under `path`.
    ///
    /// Deleting a path with nothing stored is a no-op.
    async fn delete(&self, path: &str) -> StorageResult<()>;
}
