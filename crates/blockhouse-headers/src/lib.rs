//! Versioned Header Framing
//!
//! This crate implements the typed header that precedes an opaque body of
//! bytes in a blockhouse stream. The header identifies how the body is
//! encoded, detects corruption cheaply, and leaves room for format
//! evolution through a leading version field.
//!
//! ## Wire Layout
//!
//! ```text
//! Plaintext header:
//! ┌─────────────┬──────────────┬─────────────┬───────────────────┐
//! │ version     │ header type  │ body length │ body              │
//! │ (4 bytes)   │ (4 bytes)    │ (4 bytes)   │ (length bytes)    │
//! └─────────────┴──────────────┴─────────────┴───────────────────┘
//!
//! Ciphertext header:
//! ┌─────────────┬─────────────┬──────────────┬─────────────┬──────┐
//! │ version     │ prime       │ header type  │ body length │ body │
//! │ (4 bytes)   │ (4 bytes)   │ (4 bytes)    │ (4 bytes)   │      │
//! └─────────────┴─────────────┴──────────────┴─────────────┴──────┘
//! ```
//!
//! All integers are big-endian. For the gzipped body types the stored body
//! is the gzip of the logical body and the wire length is the compressed
//! length; decoders hand back the uncompressed body and length.
//!
//! The ciphertext variant carries a fixed prime sentinel immediately after
//! the version. It is a cheap check that the stream was produced by this
//! library (and, for encrypted bodies, that decryption upstream did not
//! garble the framing). Encryption itself happens elsewhere; this crate
//! only frames.
//!
//! ## Incremental Decoding
//!
//! The buffer decoders never treat a short buffer as an error: they return
//! `Ok(None)` so callers accumulating bytes from a network or file stream
//! can simply read more and retry. A completed parse reports the exact
//! byte count consumed; any remaining bytes belong to downstream content.
//!
//! The stream decoders read directly from a [`std::io::Read`] source and
//! loop until the body is complete, so a short read mid-body is an error
//! while end-of-source after the body is not.

pub mod ciphertext;
pub mod plaintext;

pub use blockhouse_core::{Error, Result};
pub use ciphertext::{CipherHdr, CIPHER_HDR_PRIME};
pub use plaintext::PlainHdr;

use std::io::Read;

use bytes::Buf;

/// Plaintext header version 1.
pub const PLAIN_HEADER_V1: u32 = 1;

/// Current plaintext header version.
pub const PLAIN_HEADER_CUR_V: u32 = PLAIN_HEADER_V1;

/// Ciphertext header version 1.
pub const CIPHER_HEADER_V1: u32 = 1;

/// Current ciphertext header version.
pub const CIPHER_HEADER_CUR_V: u32 = CIPHER_HEADER_V1;

/// How a header body is encoded.
///
/// The numeric wire values are permanent and must never be reused for a
/// different encoding. Even values are gzip-compressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum HeaderType {
    Json = 1,
    JsonGzip = 2,
    Bson = 3,
    BsonGzip = 4,
}

impl HeaderType {
    /// All valid header body types.
    pub const ALL: [HeaderType; 4] = [
        HeaderType::Json,
        HeaderType::JsonGzip,
        HeaderType::Bson,
        HeaderType::BsonGzip,
    ];

    /// Whether the body is gzip-compressed on the wire.
    pub fn is_gzipped(self) -> bool {
        matches!(self, HeaderType::JsonGzip | HeaderType::BsonGzip)
    }
}

impl TryFrom<u32> for HeaderType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(HeaderType::Json),
            2 => Ok(HeaderType::JsonGzip),
            3 => Ok(HeaderType::Bson),
            4 => Ok(HeaderType::BsonGzip),
            other => Err(Error::UnknownHeaderType(other)),
        }
    }
}

/// Decode a plaintext header from a byte buffer.
///
/// Returns `Ok(None)` when the buffer does not yet hold a complete header;
/// callers stream more bytes and retry. On completion returns the header
/// and the exact byte count consumed.
pub fn deserialize_plain_hdr(buf: &[u8]) -> Result<Option<(PlainHdr, usize)>> {
    if buf.len() < 4 {
        return Ok(None);
    }
    match (&buf[..4]).get_u32() {
        PLAIN_HEADER_V1 => plaintext::deserialize_v1(buf),
        version => Err(Error::UnsupportedVersion(version)),
    }
}

/// Decode a ciphertext header from a byte buffer.
///
/// Same contract as [`deserialize_plain_hdr`]; additionally fails with
/// [`Error::PrimeMismatch`] as soon as a complete prefix reveals a wrong
/// sentinel.
pub fn deserialize_cipher_hdr(buf: &[u8]) -> Result<Option<(CipherHdr, usize)>> {
    if buf.len() < 4 {
        return Ok(None);
    }
    match (&buf[..4]).get_u32() {
        CIPHER_HEADER_V1 => ciphertext::deserialize_v1(buf),
        version => Err(Error::UnsupportedVersion(version)),
    }
}

/// Decode a plaintext header from a byte stream.
///
/// Reads the fixed prefix, dispatches on the version, then reads exactly
/// the body length. Returns the header and the total bytes consumed from
/// the source. A source that ends mid-header is an error.
pub fn deserialize_plain_hdr_stream<R: Read>(source: &mut R) -> Result<(PlainHdr, usize)> {
    let version = read_version(source)?;
    match version {
        PLAIN_HEADER_V1 => plaintext::deserialize_v1_stream(source),
        version => Err(Error::UnsupportedVersion(version)),
    }
}

/// Decode a ciphertext header from a byte stream.
///
/// Same contract as [`deserialize_plain_hdr_stream`].
pub fn deserialize_cipher_hdr_stream<R: Read>(source: &mut R) -> Result<(CipherHdr, usize)> {
    let version = read_version(source)?;
    match version {
        CIPHER_HEADER_V1 => ciphertext::deserialize_v1_stream(source),
        version => Err(Error::UnsupportedVersion(version)),
    }
}

fn read_version<R: Read>(source: &mut R) -> Result<u32> {
    let mut version = [0u8; 4];
    source.read_exact(&mut version)?;
    Ok(u32::from_be_bytes(version))
}
