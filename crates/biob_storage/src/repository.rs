//! Entity-scoped access to a storage backend.

use crate::{BinaryObject, BinaryObjectMetadata, BinaryObjectStorage, Payload};
use biob_error::StorageResult;
use std::sync::Arc;
use uuid::Uuid;

type IdSupplier<T> = Box<dyn Fn() -> T + Send + Sync>;
type PathFn<E, T> = Box<dyn Fn(&E, &T) -> String + Send + Sync>;

/// Stores binary objects on behalf of application entities.
///
/// Each object is addressed by the pair `(entity, id)`. The repository derives
/// the storage path from that pair with a caller-supplied function and routes
/// the operation to the backend. It keeps no state of its own: the caller is
/// responsible for remembering the returned id, typically in the entity's own
/// record.
///
/// The path function is the only thing separating objects of different
/// entities, so it must map distinct `(entity, id)` pairs to distinct paths.
///
/// # Example
///
/// ```
/// use biob_storage::{BinaryObjectMetadata, BinaryObjectRepository, InMemoryStorage, payload_from_bytes};
/// use std::sync::Arc;
///
/// struct User {
///     id: u64,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = BinaryObjectRepository::with_uuid_ids(
///     |user: &User, id| format!("{}/images/{}", user.id, id),
///     Arc::new(InMemoryStorage::new()),
/// );
///
/// let user = User { id: 1 };
/// let metadata = BinaryObjectMetadata::new(3, "avatar.png", "image/png");
/// let id = repository.store(&user, &metadata, payload_from_bytes(vec![1u8, 2, 3])).await?;
///
/// assert!(repository.has_binary_object(&user, &id).await?);
/// # Ok(())
/// # }
/// ```
pub struct BinaryObjectRepository<E, T> {
    id_supplier: IdSupplier<T>,
    path_fn: PathFn<E, T>,
    storage: Arc<dyn BinaryObjectStorage>,
}

impl<E, T> BinaryObjectRepository<E, T> {
    /// Create a repository.
    ///
    /// # Arguments
    ///
    /// * `id_supplier` - Generates a fresh identifier for every stored object
    /// * `path_fn` - Derives the storage path of `(entity, id)`
    /// * `storage` - Backend the objects are stored in
    pub fn new(
        id_supplier: impl Fn() -> T + Send + Sync + 'static,
        path_fn: impl Fn(&E, &T) -> String + Send + Sync + 'static,
        storage: Arc<dyn BinaryObjectStorage>,
    ) -> Self {
        Self {
            id_supplier: Box::new(id_supplier),
            path_fn: Box::new(path_fn),
            storage,
        }
    }

    /// Backend the repository delegates to.
    pub fn storage(&self) -> &Arc<dyn BinaryObjectStorage> {
        &self.storage
    }

    /// Storage path of the object identified by `(entity, id)`.
    pub fn path_for(&self, entity: &E, id: &T) -> String {
        (self.path_fn)(entity, id)
    }

    /// Store a payload for `entity` under a newly generated id.
    ///
    /// # Returns
    ///
    /// The generated id. Together with `entity` it addresses the object in all
    /// other repository operations.
    pub async fn store(
        &self,
        entity: &E,
        metadata: &BinaryObjectMetadata,
        payload: Payload,
    ) -> StorageResult<T> {
        let id = (self.id_supplier)();
        let path = self.path_for(entity, &id);
        tracing::debug!(path = %path, "Storing binary object for entity");

        self.storage.store(&path, metadata, payload).await?;
        Ok(id)
    }

    /// Retrieve the object identified by `(entity, id)`.
    pub async fn retrieve(&self, entity: &E, id: &T) -> StorageResult<Option<BinaryObject>> {
        self.storage.retrieve(&self.path_for(entity, id)).await
    }

    /// Get the metadata of the object identified by `(entity, id)`.
    pub async fn get_metadata(
        &self,
        entity: &E,
        id: &T,
    ) -> StorageResult<Option<BinaryObjectMetadata>> {
        self.storage.get_metadata(&self.path_for(entity, id)).await
    }

    /// Check whether an object is stored for `(entity, id)`.
    pub async fn has_binary_object(&self, entity: &E, id: &T) -> StorageResult<bool> {
        self.storage
            .has_binary_object(&self.path_for(entity, id))
            .await
    }

    /// Delete the object identified by `(entity, id)`.
    pub async fn delete(&self, entity: &E, id: &T) -> StorageResult<()> {
        self.storage.delete(&self.path_for(entity, id)).await
    }
}

impl<E> BinaryObjectRepository<E, Uuid> {
    /// Create a repository that identifies objects with random v4 UUIDs.
    pub fn with_uuid_ids(
        path_fn: impl Fn(&E, &Uuid) -> String + Send + Sync + 'static,
        storage: Arc<dyn BinaryObjectStorage>,
    ) -> Self {
        Self::new(Uuid::new_v4, path_fn, storage)
    }
}

impl<E, T> std::fmt::Debug for BinaryObjectRepository<E, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryObjectRepository")
            .field("id_supplier", &"<fn>")
            .field("path_fn", &"<fn>")
            .finish_non_exhaustive()
    }
}
