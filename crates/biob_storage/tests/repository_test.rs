//! Tests for the entity-scoped binary object repository.

use biob_storage::{
    BinaryObjectMetadata, BinaryObjectRepository, BinaryObjectStorage, FileSystemStorage,
    InMemoryStorage, payload_from_bytes,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;
use uuid::Uuid;

struct User {
    id: u64,
}

fn example_metadata() -> BinaryObjectMetadata {
    BinaryObjectMetadata::new(3, "test.jpg", "image/jpg")
}

fn user_images(storage: Arc<dyn BinaryObjectStorage>) -> BinaryObjectRepository<User, Uuid> {
    BinaryObjectRepository::with_uuid_ids(
        |user: &User, id: &Uuid| format!("{}/images/{}", user.id, id),
        storage,
    )
}

#[tokio::test]
async fn test_store_and_retrieve() {
    let storage = InMemoryStorage::new();
    let repository = user_images(Arc::new(storage.clone()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    let mut object = repository.retrieve(&user, &id).await.unwrap().unwrap();
    assert_eq!(object.read_to_vec().await.unwrap(), vec![1, 2, 3]);
    assert_eq!(object.metadata(), &example_metadata());

    assert!(
        storage
            .has_binary_object(&format!("1/images/{}", id))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_get_metadata() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    assert_eq!(
        repository.get_metadata(&user, &id).await.unwrap(),
        Some(example_metadata())
    );
}

#[tokio::test]
async fn test_has_binary_object() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    assert!(repository.has_binary_object(&user, &id).await.unwrap());
}

#[tokio::test]
async fn test_has_binary_object_with_different_entity() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    let other = User { id: 123 };
    assert!(!repository.has_binary_object(&other, &id).await.unwrap());
    assert!(repository.retrieve(&other, &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_with_different_entity_leaves_object() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    repository.delete(&User { id: 123 }, &id).await.unwrap();

    assert!(repository.has_binary_object(&user, &id).await.unwrap());
}

#[tokio::test]
async fn test_delete() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    repository.delete(&user, &id).await.unwrap();

    assert!(!repository.has_binary_object(&user, &id).await.unwrap());
    assert!(repository.retrieve(&user, &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_generates_fresh_ids() {
    let repository = user_images(Arc::new(InMemoryStorage::new()));
    let user = User { id: 1 };

    let first = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();
    let second = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![4u8, 5, 6]))
        .await
        .unwrap();

    assert_ne!(first, second);
    let mut object = repository.retrieve(&user, &first).await.unwrap().unwrap();
    assert_eq!(object.read_to_vec().await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_custom_id_supplier_over_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let storage: Arc<dyn BinaryObjectStorage> =
        Arc::new(FileSystemStorage::new(temp_dir.path()).unwrap());

    let counter = AtomicU32::new(0);
    let repository = BinaryObjectRepository::new(
        move || counter.fetch_add(1, Ordering::SeqCst) + 1,
        |user: &User, id: &u32| format!("{}/attachments/{}", user.id, id),
        storage,
    );
    let user = User { id: 7 };

    let id = repository
        .store(&user, &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
        .await
        .unwrap();

    assert_eq!(id, 1);
    assert_eq!(repository.path_for(&user, &id), "7/attachments/1");
    assert!(temp_dir.path().join("7/attachments/1").exists());
    assert_eq!(
        repository.get_metadata(&user, &id).await.unwrap(),
        Some(example_metadata())
    );
}
