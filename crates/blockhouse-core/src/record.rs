//! Record Trait
//!
//! [`BlockRecord`] connects application payloads to the block list
//! writer/reader. The writer calls [`BlockRecord::encode`] to obtain the
//! bytes stored in a block; the reader calls [`BlockRecord::decode`] to
//! rebuild a fresh value from the stored bytes. The record type is chosen
//! by the caller at reader construction, so each list decodes to exactly
//! one type.
//!
//! Raw byte payloads are supported out of the box through the `Vec<u8>` and
//! `Bytes` impls (identity encode/decode). Structured payloads typically go
//! through the JSON helpers in [`crate::util`]:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Entry { keys: Vec<u64> }
//!
//! impl BlockRecord for Entry {
//!     fn encode(&self) -> Result<Vec<u8>> {
//!         util::to_json_vec(self)
//!     }
//!     fn decode(bytes: &[u8]) -> Result<Self> {
//!         util::from_json_slice(bytes)
//!     }
//! }
//! ```

use bytes::Bytes;

use crate::error::Result;

/// A payload that can be stored in a block list.
pub trait BlockRecord: Sized {
    /// Serialize the record to the bytes stored in a block.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Rebuild a record from stored block bytes.
    fn decode(bytes: &[u8]) -> Result<Self>;
}

impl BlockRecord for Vec<u8> {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

impl BlockRecord for Bytes {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Bytes::copy_from_slice(bytes))
    }
}
