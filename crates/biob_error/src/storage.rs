//! Storage error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// The storage path cannot name an object
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Failed to create a directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write a payload or metadata file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read a payload or metadata file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Failed to remove a payload or metadata file
    #[display("Failed to delete file: {}", _0)]
    FileDelete(String),
    /// Failed to read the payload stream handed to `store`
    #[display("Failed to read payload stream: {}", _0)]
    PayloadRead(String),
    /// Metadata exists but could not be decoded
    #[display("Malformed metadata: {}", _0)]
    MetadataDecode(String),
    /// A payload exists without its metadata
    #[display("Inconsistent object state: {}", _0)]
    InconsistentState(String),
    /// Invalid storage configuration
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use biob_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileRead("images/1: denied".to_string()));
/// assert!(format!("{}", err).contains("images/1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}

impl From<StorageErrorKind> for StorageError {
    #[track_caller]
    fn from(kind: StorageErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
