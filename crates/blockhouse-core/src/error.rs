//! Error Types for blockhouse
//!
//! This module defines all error types that can occur across the blockhouse
//! crates.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - `Io`: underlying source/sink failure (fatal; discard the writer)
//!
//! ### Block List Errors
//! - `PaddingViolation`: block too large for the configured padded size.
//!   The only locally recoverable error: split the record into chunks of at
//!   most `max_data_size` bytes and write each as its own block.
//! - `ListInconsistent`: the list byte span does not divide evenly by the
//!   padded block size, or the end offset precedes the initial offset
//! - `UnexpectedBlockId`: a decoded id does not follow the previous id, or
//!   does not equal the requested index
//!
//! ### Header Errors
//! - `PrimeMismatch`: ciphertext header sentinel wrong (possible corruption)
//! - `InsufficientData`: decode attempted on a definitively short buffer.
//!   Distinct from the "need more bytes" signal, which buffer decoders
//!   report as `Ok(None)` so callers can stream more input and retry.
//! - `UnsupportedVersion`: unknown format version
//! - `UnknownHeaderType`: header body type tag outside the wire-stable set
//!
//! ### Capability Errors
//! - `NotSupported`: random access, binary search, or total-block counts
//!   on an unpadded list. Store capabilities (sequential read, positioned
//!   read, seek) are compile-time trait bounds, not runtime checks, so a
//!   store that lacks one never reaches this error.
//!
//! ## Usage
//! All fallible functions return `Result<T>` aliased to `Result<T, Error>`,
//! so `?` propagation works throughout.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Block too large to pad to a fixed size: \
         padded block size {padded_block_size}, block size {block_size}, \
         max data size {max_data_size}"
    )]
    PaddingViolation {
        /// The configured on-disk size every block must occupy.
        padded_block_size: u32,
        /// Header plus data length of the offending block.
        block_size: u32,
        /// Largest payload that fits: `padded_block_size - 8`.
        max_data_size: u32,
    },

    #[error("Inconsistent block list: {0}")]
    ListInconsistent(String),

    #[error("Unexpected block id: expected {expected}, found {found}")]
    UnexpectedBlockId { expected: u32, found: u32 },

    #[error("Prime sentinel mismatch ({found:#010x}), possible corruption")]
    PrimeMismatch { found: u32 },

    #[error("Insufficient data: needed {needed} bytes, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unknown header type: {0}")]
    UnknownHeaderType(u32),

    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decompression error: {0}")]
    Decompression(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_violation_carries_sizes() {
        let err = Error::PaddingViolation {
            padded_block_size: 16,
            block_size: 38,
            max_data_size: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("38"));
        assert!(msg.contains("max data size 8"));
    }

    #[test]
    fn test_io_error_converts() {
        fn read_nothing() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"))?;
            Ok(())
        }
        assert!(matches!(read_nothing(), Err(Error::Io(_))));
    }

    #[test]
    fn test_prime_mismatch_is_hex_formatted() {
        let err = Error::PrimeMismatch { found: 0xDEADBEEF };
        assert!(err.to_string().contains("0xdeadbeef"));
    }
}
