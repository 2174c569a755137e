//! Behaviour every backend must share, run against both implementations.

use biob_storage::{
    BinaryObjectMetadata, BinaryObjectStorage, FileSystemStorage, InMemoryStorage,
    StorageErrorKind, payload_from_bytes,
};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tempfile::TempDir;
use tokio::io::{AsyncRead, ReadBuf};

fn example_metadata() -> BinaryObjectMetadata {
    BinaryObjectMetadata::new(3, "test.jpg", "image/jpg")
}

/// Both backends, labelled for assertion messages.
fn backends() -> (TempDir, Vec<(&'static str, Arc<dyn BinaryObjectStorage>)>) {
    let temp_dir = TempDir::new().unwrap();
    let file_system = FileSystemStorage::new(temp_dir.path()).unwrap();
    (
        temp_dir,
        vec![
            ("memory", Arc::new(InMemoryStorage::new())),
            ("file_system", Arc::new(file_system)),
        ],
    )
}

/// Reader that fails on the first read.
struct BrokenReader;

impl AsyncRead for BrokenReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")))
    }
}

#[tokio::test]
async fn test_equivalent_keys_name_the_same_object() {
    let (_temp_dir, backends) = backends();

    for (name, storage) in backends {
        storage
            .store("images/1/", &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
            .await
            .unwrap();

        for key in ["images/1", "./images//1", "images/./1/"] {
            assert!(
                storage.has_binary_object(key).await.unwrap(),
                "{}: {:?} should be present",
                name,
                key
            );
            assert_eq!(
                storage.get_metadata(key).await.unwrap(),
                Some(example_metadata()),
                "{}: {:?}",
                name,
                key
            );
        }

        storage.delete("./images/1").await.unwrap();
        assert!(!storage.has_binary_object("images/1").await.unwrap(), "{}", name);
    }
}

#[tokio::test]
async fn test_invalid_keys_rejected_by_every_operation() {
    let (_temp_dir, backends) = backends();

    for (name, storage) in backends {
        for key in ["", "/", "../x", "/etc/passwd", "a/../../x", "x-metadata.properties"] {
            let stored = storage
                .store(key, &example_metadata(), payload_from_bytes(vec![1u8]))
                .await;
            let retrieved = storage.retrieve(key).await.map(|object| object.is_some());
            let metadata = storage.get_metadata(key).await.map(|m| m.is_some());
            let present = storage.has_binary_object(key).await;
            let deleted = storage.delete(key).await;

            for (operation, kind) in [
                ("store", stored.err().map(|e| e.kind)),
                ("retrieve", retrieved.err().map(|e| e.kind)),
                ("get_metadata", metadata.err().map(|e| e.kind)),
                ("has_binary_object", present.err().map(|e| e.kind)),
                ("delete", deleted.err().map(|e| e.kind)),
            ] {
                assert!(
                    matches!(kind, Some(StorageErrorKind::InvalidPath(_))),
                    "{}: {} of {:?} returned {:?}",
                    name,
                    operation,
                    key,
                    kind
                );
            }
        }
    }
}

#[tokio::test]
async fn test_failed_stream_is_payload_read_error() {
    let (_temp_dir, backends) = backends();

    for (name, storage) in backends {
        storage
            .store("images/1", &example_metadata(), payload_from_bytes(vec![1u8, 2, 3]))
            .await
            .unwrap();

        let err = storage
            .store("images/1", &example_metadata(), Box::new(BrokenReader))
            .await
            .unwrap_err();
        assert!(
            matches!(err.kind, StorageErrorKind::PayloadRead(_)),
            "{}: {:?}",
            name,
            err.kind
        );

        let mut object = storage.retrieve("images/1").await.unwrap().unwrap();
        assert_eq!(object.read_to_vec().await.unwrap(), vec![1, 2, 3], "{}", name);
    }
}
