//! Block Framing
//!
//! On-disk layout of a single block in both list modes. The encoder pads
//! to the configured fixed size with OS-entropy random bytes; the decoder
//! validates the length invariants and discards the padding.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use rand::rngs::OsRng;
use rand::RngCore;

use blockhouse_core::{Error, Result};

use crate::BLOCK_HEADER_LEN;

/// A decoded block: an ordinal id, the payload length, and the payload.
///
/// Within a list, ids start at 0 and each block's id is its predecessor's
/// plus one. `size` always equals `data.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: u32,
    pub size: u32,
    pub data: Bytes,
}

impl Block {
    pub fn new(id: u32, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Block {
            id,
            size: data.len() as u32,
            data,
        }
    }

    /// Serialize the block.
    ///
    /// With `padded_block_size > 0` the output occupies exactly that many
    /// bytes and the tail past the payload is filled with random bytes;
    /// a block whose header plus payload exceeds the fixed size fails with
    /// [`Error::PaddingViolation`] carrying the sizes the caller needs to
    /// chunk and retry. With `padded_block_size == 0` the output is sized
    /// exactly to header plus payload.
    pub fn encode(&self, padded_block_size: u32) -> Result<Bytes> {
        let block_size = BLOCK_HEADER_LEN + self.size;

        let total = if padded_block_size > 0 {
            if block_size > padded_block_size {
                return Err(Error::PaddingViolation {
                    padded_block_size,
                    block_size,
                    max_data_size: padded_block_size - BLOCK_HEADER_LEN,
                });
            }
            padded_block_size
        } else {
            block_size
        };

        let mut buf = BytesMut::with_capacity(total as usize);
        buf.put_u32(self.id);
        buf.put_u32(self.size);
        buf.put_slice(&self.data);

        if padded_block_size > 0 {
            buf.resize(padded_block_size as usize, 0);
            // Random fill, not zeros: nothing downstream may rely on the
            // padding content.
            OsRng.fill_bytes(&mut buf[block_size as usize..]);
        }

        Ok(buf.freeze())
    }

    /// Deserialize a block from its on-disk bytes.
    ///
    /// In padded mode the input must be exactly `padded_block_size` long.
    pub fn decode(padded_block_size: u32, bytes: &[u8]) -> Result<Block> {
        let total = bytes.len();

        if total < BLOCK_HEADER_LEN as usize {
            return Err(Error::InsufficientData {
                needed: BLOCK_HEADER_LEN as usize,
                got: total,
            });
        }

        if padded_block_size > 0 {
            if total < padded_block_size as usize {
                return Err(Error::InsufficientData {
                    needed: padded_block_size as usize,
                    got: total,
                });
            }
            if total > padded_block_size as usize {
                return Err(Error::ListInconsistent(format!(
                    "block span of {total} bytes exceeds padded block size {padded_block_size}"
                )));
            }
        }

        let mut cursor = bytes;
        let id = cursor.get_u32();
        let size = cursor.get_u32();

        let data_end = BLOCK_HEADER_LEN as usize + size as usize;
        if data_end > total {
            return Err(Error::InsufficientData {
                needed: data_end,
                got: total,
            });
        }

        Ok(Block {
            id,
            size,
            data: Bytes::copy_from_slice(&bytes[BLOCK_HEADER_LEN as usize..data_end]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TESTSTR: &[u8] = b"Calling Multistream(false) disables this behavior; \
        disabling the behavior can be useful when reading file formats that \
        distinguish individual gzip data streams.";

    // ---------------------------------------------------------------
    // Encode
    // ---------------------------------------------------------------

    #[test]
    fn test_encode_padded_sizes() {
        let data_size = 30u32;
        let block = Block::new(1, &TESTSTR[..data_size as usize]);

        // exact fit, roomy fits, too small, unpadded
        for padded in [
            data_size + 8,
            data_size + 8 + 10,
            data_size + 8 + 100,
            data_size + 8 - 10,
            0,
        ] {
            let result = block.encode(padded);

            if padded > 0 && padded < data_size + 8 {
                match result.unwrap_err() {
                    Error::PaddingViolation {
                        padded_block_size,
                        block_size,
                        max_data_size,
                    } => {
                        assert_eq!(padded_block_size, padded);
                        assert_eq!(block_size, data_size + 8);
                        assert_eq!(max_data_size, padded - 8);
                    }
                    other => panic!("expected PaddingViolation, got {other:?}"),
                }
            } else {
                let serial = result.unwrap();
                let expected = if padded > 0 { padded } else { data_size + 8 };
                assert_eq!(serial.len() as u32, expected);
                assert_eq!(&serial[8..8 + data_size as usize], &block.data[..]);

                let decoded = Block::decode(padded, &serial).unwrap();
                assert_eq!(decoded, block);
            }
        }
    }

    #[test]
    fn test_encode_header_fields_are_big_endian() {
        let block = Block::new(0x01020304, b"ab".as_slice());
        let serial = block.encode(0).unwrap();
        assert_eq!(&serial[..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&serial[4..8], &[0, 0, 0, 2]);
    }

    #[test]
    fn test_encode_empty_data() {
        let block = Block::new(0, Bytes::new());
        let serial = block.encode(0).unwrap();
        assert_eq!(serial.len(), 8);

        let decoded = Block::decode(0, &serial).unwrap();
        assert_eq!(decoded.size, 0);
        assert!(decoded.data.is_empty());

        let padded = block.encode(16).unwrap();
        assert_eq!(padded.len(), 16);
        assert_eq!(Block::decode(16, &padded).unwrap(), block);
    }

    #[test]
    fn test_exact_fit_succeeds_one_less_fails() {
        let block = Block::new(3, vec![0xAAu8; 24]);
        assert!(block.encode(32).is_ok());

        match block.encode(31).unwrap_err() {
            Error::PaddingViolation {
                padded_block_size,
                block_size,
                max_data_size,
            } => {
                assert_eq!(padded_block_size, 31);
                assert_eq!(block_size, 32);
                assert_eq!(max_data_size, 23);
            }
            other => panic!("expected PaddingViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_padding_varies_between_encodes() {
        // Random padding means two encodes of the same block differ in the
        // tail (with 2^-160 odds of a false failure on 20 pad bytes).
        let block = Block::new(0, b"fixed".as_slice());
        let a = block.encode(33).unwrap();
        let b = block.encode(33).unwrap();
        assert_eq!(a[..13], b[..13]);
        assert_ne!(a[13..], b[13..]);
    }

    // ---------------------------------------------------------------
    // Decode
    // ---------------------------------------------------------------

    #[test]
    fn test_decode_too_short_for_header() {
        let err = Block::decode(0, &[0u8; 7]).unwrap_err();
        match err {
            Error::InsufficientData { needed, got } => {
                assert_eq!(needed, 8);
                assert_eq!(got, 7);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_padded_length_mismatch() {
        let serial = Block::new(0, b"data".as_slice()).encode(32).unwrap();
        assert!(Block::decode(64, &serial).is_err());
        assert!(Block::decode(16, &serial).is_err());
        assert!(Block::decode(32, &serial).is_ok());
    }

    #[test]
    fn test_decode_size_field_larger_than_buffer() {
        let mut serial = Block::new(0, b"1234".as_slice()).encode(0).unwrap().to_vec();
        serial[4..8].copy_from_slice(&100u32.to_be_bytes());
        assert!(matches!(
            Block::decode(0, &serial),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_decode_discards_padding() {
        let block = Block::new(7, b"payload".as_slice());
        let serial = block.encode(64).unwrap();
        let decoded = Block::decode(64, &serial).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.size, 7);
        assert_eq!(decoded.data, Bytes::from_static(b"payload"));
    }
}
