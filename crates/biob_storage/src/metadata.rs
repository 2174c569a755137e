//! Binary object metadata types.

use derive_getters::Getters;

/// Descriptive metadata stored alongside a binary payload.
///
/// Values are immutable once constructed. Replacing the metadata of a stored
/// object requires storing the object again.
///
/// # Examples
///
/// ```
/// use biob_storage::BinaryObjectMetadata;
///
/// let metadata = BinaryObjectMetadata::new(3, "test.jpg", "image/jpg");
/// assert_eq!(*metadata.file_size(), 3);
/// assert_eq!(metadata.original_filename(), "test.jpg");
/// assert_eq!(metadata, BinaryObjectMetadata::new(3, "test.jpg", "image/jpg"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, derive_more::Display)]
#[display(
    "BinaryObjectMetadata[fileSize={}, originalFilename='{}', contentType='{}']",
    file_size,
    original_filename,
    content_type
)]
pub struct BinaryObjectMetadata {
    /// Size of the payload in bytes
    file_size: u64,
    /// Filename the payload was uploaded with
    original_filename: String,
    /// MIME type (e.g., "image/png")
    content_type: String,
}

impl BinaryObjectMetadata {
    /// Create a new metadata record.
    pub fn new(
        file_size: u64,
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            file_size,
            original_filename: original_filename.into(),
            content_type: content_type.into(),
        }
    }
}
