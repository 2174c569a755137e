//! Binary object storage for biob.
//!
//! This crate stores binary payloads (uploaded files, images, documents)
//! together with descriptive metadata, addressed by a slash-separated path key.
//!
//! # Features
//!
//! - **Pluggable backends**: [`BinaryObjectStorage`] is implemented by an
//!   in-memory backend and a local filesystem backend
//! - **Metadata alongside payloads**: size, original filename and content type
//!   are stored and retrieved with every object, and can be read on their own
//! - **Entity-scoped repository**: [`BinaryObjectRepository`] derives storage
//!   paths from an application entity and a generated id
//!
//! # Example
//!
//! ```rust
//! use biob_storage::{BinaryObjectMetadata, BinaryObjectStorage, FileSystemStorage, payload_from_bytes};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = FileSystemStorage::new("/tmp/biob")?;
//! let metadata = BinaryObjectMetadata::new(3, "test.jpg", "image/jpg");
//!
//! // Store an object
//! storage.store("images/1", &metadata, payload_from_bytes(vec![1u8, 2, 3])).await?;
//!
//! // Retrieve it
//! if let Some(mut object) = storage.retrieve("images/1").await? {
//!     assert_eq!(object.read_to_vec().await?, vec![1, 2, 3]);
//!     assert_eq!(object.metadata(), &metadata);
//! }
//!
//! // Delete it
//! storage.delete("images/1").await?;
//! assert!(!storage.has_binary_object("images/1").await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filesystem;
mod memory;
mod metadata;
pub mod metadata_file;
mod object;
mod observability;
mod path;
mod repository;
mod storage;

pub use biob_error::{StorageError, StorageErrorKind, StorageResult};
pub use config::{ENV_PREFIX, StorageConfig};
pub use filesystem::FileSystemStorage;
pub use memory::InMemoryStorage;
pub use metadata::BinaryObjectMetadata;
pub use object::{BinaryObject, Payload, payload_from_bytes};
pub use observability::{ObservabilityConfig, init_tracing, init_tracing_with_config};
pub use path::METADATA_SUFFIX;
pub use repository::BinaryObjectRepository;
pub use storage::BinaryObjectStorage;
