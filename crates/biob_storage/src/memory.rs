//! In-memory binary object storage.
//!
//! Useful for tests and for processes that only need objects for their own
//! lifetime. Nothing is persisted.

use crate::path::normalize_key;
use crate::{BinaryObject, BinaryObjectMetadata, BinaryObjectStorage, Payload};
use biob_error::{StorageError, StorageErrorKind, StorageResult};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

/// In-memory storage backend.
///
/// Objects are kept in a HashMap protected by an RwLock. Clones share the same
/// map; separate instances created with [`InMemoryStorage::new`] do not. All
/// data is lost when the last clone is dropped.
///
/// # Example
///
/// ```
/// use biob_storage::{BinaryObjectMetadata, BinaryObjectStorage, InMemoryStorage, payload_from_bytes};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = InMemoryStorage::new();
/// let metadata = BinaryObjectMetadata::new(3, "test.jpg", "image/jpg");
///
/// storage.store("images/1", &metadata, payload_from_bytes(vec![1u8, 2, 3])).await?;
/// assert!(storage.has_binary_object("images/1").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

/// Payload bytes and metadata of one stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Arc<[u8]>,
    metadata: BinaryObjectMetadata,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Check if the storage is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Remove all objects.
    pub async fn clear(&self) {
        self.objects.write().await.clear();
    }
}

#[async_trait::async_trait]
impl BinaryObjectStorage for InMemoryStorage {
    #[tracing::instrument(skip(self, path, metadata, payload), fields(path = %path, content_type = %metadata.content_type()))]
    async fn store(
        &self,
        path: &str,
        metadata: &BinaryObjectMetadata,
        mut payload: Payload,
    ) -> StorageResult<()> {
        let key = normalize_key(path)?;

        let mut bytes = Vec::new();
        payload.read_to_end(&mut bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::PayloadRead(format!("{}: {}", path, e)))
        })?;
        drop(payload);

        let size = bytes.len();
        self.objects.write().await.insert(
            key,
            StoredObject {
                bytes: bytes.into(),
                metadata: metadata.clone(),
            },
        );

        tracing::info!(size, "Stored binary object in memory");
        Ok(())
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn retrieve(&self, path: &str) -> StorageResult<Option<BinaryObject>> {
        let key = normalize_key(path)?;
        let stored = self.objects.read().await.get(&key).cloned();
        let Some(stored) = stored else {
            tracing::debug!("Binary object not found");
            return Ok(None);
        };

        tracing::debug!(size = stored.bytes.len(), "Retrieved binary object");
        Ok(Some(BinaryObject::new(
            Cursor::new(stored.bytes),
            stored.metadata,
        )))
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn get_metadata(&self, path: &str) -> StorageResult<Option<BinaryObjectMetadata>> {
        let key = normalize_key(path)?;
        Ok(self
            .objects
            .read()
            .await
            .get(&key)
            .map(|stored| stored.metadata.clone()))
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn has_binary_object(&self, path: &str) -> StorageResult<bool> {
        let key = normalize_key(path)?;
        Ok(self.objects.read().await.contains_key(&key))
    }

    #[tracing::instrument(skip(self, path), fields(path = %path))]
    async fn delete(&self, path: &str) -> StorageResult<()> {
        let key = normalize_key(path)?;
        match self.objects.write().await.remove(&key) {
            Some(_) => tracing::info!("Deleted binary object from memory"),
            None => tracing::debug!("Nothing stored, delete is a no-op"),
        }
        Ok(())
    }
}
