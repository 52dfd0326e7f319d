//! Block List Writer
//!
//! Append-only encoder of a block list. Construction writes the 8-byte
//! list header at the store's current position; every append assigns the
//! next ordinal id and serializes the block per [`crate::block`].
//!
//! The writer exclusively owns its store for its lifetime and never reads
//! it back. A failed store write is fatal: the caller must discard the
//! writer. The one locally recoverable failure is
//! [`Error::PaddingViolation`], raised when a record is too large for the
//! configured padded size; the expected idiom is to split the record into
//! chunks of at most [`BlockListWriter::max_data_size`] bytes and write
//! each as its own block.

use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use blockhouse_core::gzip::gzip;
use blockhouse_core::{BlockRecord, Error, Result};

use crate::block::Block;
use crate::{BLOCK_HEADER_LEN, BLOCK_LIST_CUR_V, LIST_HEADER_LEN};

/// Append-only block list encoder over a byte sink.
pub struct BlockListWriter<W: Write> {
    store: W,
    version: u32,
    padded_block_size: u32,
    init_offset: u64,
    cur_offset: u64,
    end_offset: u64,
    cur_block: Option<Block>,
}

impl<W: Write> BlockListWriter<W> {
    /// Create a block list at the store's current position.
    ///
    /// `init_offset` is the absolute offset at which the caller has already
    /// positioned the store; the list may be embedded inside a larger
    /// file. `padded_block_size == 0` selects unpadded mode; padded mode
    /// requires at least 9 (one payload byte past the 8-byte block
    /// header).
    ///
    /// Writes the list header immediately.
    pub fn new(mut store: W, padded_block_size: u32, init_offset: u64) -> Result<Self> {
        if padded_block_size > 0 && padded_block_size <= BLOCK_HEADER_LEN {
            return Err(Error::ListInconsistent(format!(
                "padded block size {} cannot hold any payload (minimum {})",
                padded_block_size,
                BLOCK_HEADER_LEN + 1
            )));
        }

        let mut hdr = BytesMut::with_capacity(LIST_HEADER_LEN as usize);
        hdr.put_u32(BLOCK_LIST_CUR_V);
        hdr.put_u32(padded_block_size);
        store.write_all(&hdr)?;

        let init_offset = init_offset + LIST_HEADER_LEN as u64;
        tracing::debug!(padded_block_size, init_offset, "created block list writer");

        Ok(BlockListWriter {
            store,
            version: BLOCK_LIST_CUR_V,
            padded_block_size,
            init_offset,
            cur_offset: init_offset,
            end_offset: init_offset,
            cur_block: None,
        })
    }

    /// Consume the writer and hand the sink back. The writer never closes
    /// or flushes its sink beyond the writes themselves; disposing of it
    /// is the caller's job on every path.
    pub fn into_store(self) -> W {
        self.store
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_padded(&self) -> bool {
        self.padded_block_size > 0
    }

    pub fn padded_block_size(&self) -> u32 {
        self.padded_block_size
    }

    /// The last block written, if any.
    pub fn cur_block(&self) -> Option<&Block> {
        self.cur_block.as_ref()
    }

    /// Largest payload a single block can carry.
    pub fn max_data_size(&self) -> u32 {
        if self.is_padded() {
            self.padded_block_size - BLOCK_HEADER_LEN
        } else {
            u32::MAX
        }
    }

    /// Number of blocks written so far. Only computable in padded mode.
    pub fn total_blocks(&self) -> Result<u32> {
        if !self.is_padded() {
            return Err(Error::NotSupported(
                "total block count requires a padded block list",
            ));
        }
        self.check_list_valid()?;

        let block_bytes = self.end_offset - self.init_offset;
        Ok((block_bytes / u64::from(self.padded_block_size)) as u32)
    }

    fn check_list_valid(&self) -> Result<()> {
        if self.end_offset < self.init_offset {
            return Err(Error::ListInconsistent(format!(
                "initial offset {} is past the end offset {}",
                self.init_offset, self.end_offset
            )));
        }

        if self.is_padded() {
            let block_bytes = self.end_offset - self.init_offset;
            if block_bytes % u64::from(self.padded_block_size) > 0 {
                return Err(Error::ListInconsistent(format!(
                    "block span of {} bytes does not divide evenly by padded block size {}",
                    block_bytes, self.padded_block_size
                )));
            }
        }

        Ok(())
    }

    /// Serialize a record the way [`Self::write_block_data`] would store
    /// it, without writing. Lets callers size-check before committing.
    ///
    /// Unpadded lists gzip the encoded record on the wire; padded lists
    /// store it raw so every block keeps a predictable ceiling.
    pub fn serialize_block_data<T: BlockRecord>(&self, record: &T) -> Result<Vec<u8>> {
        let encoded = record.encode()?;
        if !self.is_padded() {
            return gzip(&encoded);
        }
        Ok(encoded)
    }

    /// Encode a record and append it as the next block.
    ///
    /// Returns the written block. A [`Error::PaddingViolation`] leaves the
    /// store untouched; chunk the record and retry.
    pub fn write_block_data<T: BlockRecord>(&mut self, record: &T) -> Result<Block> {
        let data = self.serialize_block_data(record)?;
        self.write_block_bytes(&data)
    }

    /// Append pre-serialized block payload bytes as the next block.
    pub fn write_block_bytes(&mut self, data: &[u8]) -> Result<Block> {
        let id = match &self.cur_block {
            Some(block) => block.id + 1,
            None => 0,
        };
        let block = Block::new(id, Bytes::copy_from_slice(data));

        let serial = block.encode(self.padded_block_size)?;
        self.store.write_all(&serial)?;

        self.cur_offset += serial.len() as u64;
        self.end_offset = self.cur_offset;
        tracing::trace!(id, bytes = serial.len(), "wrote block");

        self.cur_block = Some(block.clone());
        Ok(block)
    }
}
