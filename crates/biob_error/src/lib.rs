//! Error types for the biob storage library.
//!
//! All storage failures are reported through a single [`StorageError`], which
//! follows the `ErrorKind` + wrapper struct pattern:
//! - [`StorageErrorKind`] names the specific failure and carries the path or
//!   message needed for diagnostics
//! - [`StorageError`] wraps the kind with source location tracking via
//!   `#[track_caller]`
//!
//! Not-found is never an error in this library. Lookups report absence through
//! `Option`, and deleting a missing object succeeds.
//!
//! # Examples
//!
//! ```
//! use biob_error::{StorageError, StorageErrorKind, StorageResult};
//!
//! fn open(path: &str) -> StorageResult<()> {
//!     if path.is_empty() {
//!         return Err(StorageError::new(StorageErrorKind::InvalidPath(
//!             "path must not be empty".to_string(),
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(open("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod storage;

pub use storage::{StorageError, StorageErrorKind, StorageResult};
