//! Plaintext Header
//!
//! The plaintext variant of the typed header: a 12-byte fixed prefix
//! (version, body type, stored body length) followed by the body. Gzipped
//! body types store the compressed bytes and the compressed length on the
//! wire; in memory the header always holds the logical (uncompressed) body.

use std::io::Read;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use blockhouse_core::gzip::{gunzip, gzip};
use blockhouse_core::Result;

use crate::{HeaderType, PLAIN_HEADER_CUR_V};

/// Fixed prefix length: version + type + body length.
pub const PLAIN_HDR_FIXED_LEN: usize = 12;

/// A plaintext header.
///
/// `hdr_len` and `body` are the logical (uncompressed) length and bytes,
/// regardless of whether the wire form is gzipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainHdr {
    pub version: u32,
    pub hdr_type: HeaderType,
    pub hdr_len: u32,
    pub body: Bytes,
}

impl PlainHdr {
    /// Create a current-version plaintext header around a logical body.
    pub fn new(hdr_type: HeaderType, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        PlainHdr {
            version: PLAIN_HEADER_CUR_V,
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

        let mut buf = BytesMut::with_capacity(PLAIN_HDR_FIXED_LEN + body.len());
        buf.put_u32(self.version);
        buf.put_u32(self.hdr_type as u32);
        buf.put_u32(body.len() as u32);
        buf.put_slice(&body);
        Ok(buf.to_vec())
    }
}

/// Decode a version-1 plaintext header from a buffer.
///
/// `Ok(None)` means the buffer is short of a complete header; the caller
/// should retry with more bytes.
pub(crate) fn deserialize_v1(buf: &[u8]) -> Result<Option<(PlainHdr, usize)>> {
    if buf.len() < PLAIN_HDR_FIXED_LEN {
        return Ok(None);
    }

    let mut cursor = buf;
    let version = cursor.get_u32();
    let hdr_type = HeaderType::try_from(cursor.get_u32())?;
    let stored_len = cursor.get_u32() as usize;

    let total = PLAIN_HDR_FIXED_LEN + stored_len;
    if buf.len() < total {
        return Ok(None);
    }

    let hdr = finish_v1(version, hdr_type, &buf[PLAIN_HDR_FIXED_LEN..total])?;
    Ok(Some((hdr, total)))
}

/// Decode a version-1 plaintext header from a stream. The version has
/// already been consumed by the dispatcher.
pub(crate) fn deserialize_v1_stream<R: Read>(source: &mut R) -> Result<(PlainHdr, usize)> {
    let mut fixed = [0u8; 8];
    source.read_exact(&mut fixed)?;
    let mut cursor = &fixed[..];
    let hdr_type = HeaderType::try_from(cursor.get_u32())?;
    let stored_len = cursor.get_u32() as usize;

    let mut stored = vec![0u8; stored_len];
    source.read_exact(&mut stored)?;

    let hdr = finish_v1(crate::PLAIN_HEADER_V1, hdr_type, &stored)?;
    Ok((hdr, PLAIN_HDR_FIXED_LEN + stored_len))
}

fn finish_v1(version: u32, hdr_type: HeaderType, stored: &[u8]) -> Result<PlainHdr> {
    let body: Bytes = if hdr_type.is_gzipped() {
        gunzip(stored)
            .map_err(|e| {
                tracing::warn!(error = %e, "header body failed to decompress");
                e
            })?
            .into()
    } else {
        Bytes::copy_from_slice(stored)
    };

    Ok(PlainHdr {
        version,
        hdr_type,
        hdr_len: body.len() as u32,
        body,
    })
}
