//! Binary object and payload stream types.

use crate::BinaryObjectMetadata;
use biob_error::{StorageError, StorageErrorKind, StorageResult};
use std::io::Cursor;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Owned, single-read byte stream carrying a payload.
///
/// Dropping the stream releases whatever handle backs it (file, buffer, socket).
pub type Payload = Box<dyn AsyncRead + Send + Unpin>;

/// Wrap an in-memory buffer as a [`Payload`].
///
/// # Examples
///
/// ```
/// use biob_storage::payload_from_bytes;
///
/// let payload = payload_from_bytes(vec![1u8, 2, 3]);
/// # drop(payload);
/// ```
pub fn payload_from_bytes<B>(bytes: B) -> Payload
where
    B: AsRef<[u8]> + Send + Unpin + 'static,
{
    Box::new(Cursor::new(bytes))
}

/// A retrieved payload together with its metadata.
///
/// The caller owns the payload stream. It can be consumed once; a fresh stream
/// requires another `retrieve` call.
pub struct BinaryObject {
    payload: Payload,
    metadata: BinaryObjectMetadata,
}

impl BinaryObject {
    /// Pair a payload stream with its metadata.
    pub fn new(
        payload: impl AsyncRead + Send + Unpin + 'static,
        metadata: BinaryObjectMetadata,
    ) -> Self {
        Self {
            payload: Box::new(payload),
            metadata,
        }
    }

    /// Metadata of the object.
    pub fn metadata(&self) -> &BinaryObjectMetadata {
        &self.metadata
    }

    /// Mutable access to the payload stream for incremental reads.
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Split into the payload stream and the metadata.
    pub fn into_parts(self) -> (Payload, BinaryObjectMetadata) {
        (self.payload, self.metadata)
    }

    /// Drain the remaining payload into a buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying stream fails mid-read.
    pub async fn read_to_vec(&mut self) -> StorageResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.payload.read_to_end(&mut buf).await.map_err(|e| {
            StorageError::new(StorageErrorKind::PayloadRead(e.to_string()))
        })?;
        Ok(buf)
    }
}

impl std::fmt::Debug for BinaryObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryObject")
            .field("payload", &"<stream>")
            .field("metadata", &self.metadata)
            .finish()
    }
}
