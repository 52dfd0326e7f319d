//! Ciphertext Header
//!
//! The ciphertext variant of the typed header. Identical to the plaintext
//! layout except for a fixed 32-bit prime sentinel between the version and
//! the body type. The sentinel is a cheap recognition check: a stream that
//! was not produced by this library, or whose framing was garbled by a bad
//! decryption upstream, fails fast with a corruption error instead of
//! misparsing the remaining fields.
//!
//! The body itself is opaque here; encrypting it is the caller's business.

use std::io::Read;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use blockhouse_core::gzip::{gunzip, gzip};
use blockhouse_core::{Error, Result};

use crate::{HeaderType, CIPHER_HEADER_CUR_V};

/// The prime sentinel. Permanent; changing it orphans every stream ever
/// written.
pub const CIPHER_HDR_PRIME: u32 = 1_879_785_779;

/// Fixed prefix length: version + prime + type + body length.
pub const CIPHER_HDR_FIXED_LEN: usize = 16;

/// A ciphertext header.
///
/// As with [`crate::PlainHdr`], `hdr_len` and `body` hold the logical
/// (uncompressed) length and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherHdr {
    pub version: u32,
    pub prime: u32,
    pub hdr_type: HeaderType,
    pub hdr_len: u32,
    pub body: Bytes,
}

impl CipherHdr {
    /// Create a current-version ciphertext header around a logical body.
    pub fn new(hdr_type: HeaderType, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        CipherHdr {
            version: CIPHER_HEADER_CUR_V,
            prime: CIPHER_HDR_PRIME,
            hdr_type,
            hdr_len: body.len() as u32,
            body,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Serialize to wire bytes, compressing the body if the type calls
    /// for it.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let body: Bytes = if self.hdr_type.is_gzipped() {
            gzip(&self.body)?.into()
        } else {
            self.body.clone()
        };

        let mut buf = BytesMut::with_capacity(CIPHER_HDR_FIXED_LEN + body.len());
        buf.put_u32(self.version);
        buf.put_u32(self.prime);
        buf.put_u32(self.hdr_type as u32);
        buf.put_u32(body.len() as u32);
        buf.put_slice(&body);
        Ok(buf.to_vec())
    }
}

/// Decode a version-1 ciphertext header from a buffer.
///
/// `Ok(None)` means the buffer is short of a complete header. The prime is
/// checked as soon as the fixed prefix is available, so corruption
/// surfaces before the body has been streamed in.
pub(crate) fn deserialize_v1(buf: &[u8]) -> Result<Option<(CipherHdr, usize)>> {
    if buf.len() < CIPHER_HDR_FIXED_LEN {
        return Ok(None);
    }

    let mut cursor = buf;
    let version = cursor.get_u32();
    let prime = cursor.get_u32();
    check_prime(prime)?;
    let hdr_type = HeaderType::try_from(cursor.get_u32())?;
    let stored_len = cursor.get_u32() as usize;

    let total = CIPHER_HDR_FIXED_LEN + stored_len;
    if buf.len() < total {
        return Ok(None);
    }

    let hdr = finish_v1(version, hdr_type, &buf[CIPHER_HDR_FIXED_LEN..total])?;
    Ok(Some((hdr, total)))
}

/// Decode a version-1 ciphertext header from a stream. The version has
/// already been consumed by the dispatcher.
pub(crate) fn deserialize_v1_stream<R: Read>(source: &mut R) -> Result<(CipherHdr, usize)> {
    let mut fixed = [0u8; 12];
    source.read_exact(&mut fixed)?;
    let mut cursor = &fixed[..];
    let prime = cursor.get_u32();
    check_prime(prime)?;
    let hdr_type = HeaderType::try_from(cursor.get_u32())?;
    let stored_len = cursor.get_u32() as usize;

    let mut stored = vec![0u8; stored_len];
    source.read_exact(&mut stored)?;

    let hdr = finish_v1(crate::CIPHER_HEADER_V1, hdr_type, &stored)?;
    Ok((hdr, CIPHER_HDR_FIXED_LEN + stored_len))
}

fn check_prime(prime: u32) -> Result<()> {
    if prime != CIPHER_HDR_PRIME {
        tracing::warn!(found = prime, "ciphertext header sentinel mismatch");
        return Err(Error::PrimeMismatch { found: prime });
    }
    Ok(())
}

fn finish_v1(version: u32, hdr_type: HeaderType, stored: &[u8]) -> Result<CipherHdr> {
    let body: Bytes = if hdr_type.is_gzipped() {
        gunzip(stored)?.into()
    } else {
        Bytes::copy_from_slice(stored)
    };

    Ok(CipherHdr {
        version,
        prime: CIPHER_HDR_PRIME,
        hdr_type,
        hdr_len: body.len() as u32,
        body,
    })
}
