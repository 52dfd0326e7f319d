//! Block List Reader
//!
//! Sequential and random decoding of a block list inside a byte window
//! `[init_offset, end_offset)`, plus the search layer on top.
//!
//! Construction parses the 8-byte list header; the on-disk header is
//! authoritative for the list mode, whatever the writer was configured
//! with. Sequential reads verify the id chain; random reads verify that
//! the decoded id matches the requested ordinal.
//!
//! Random access and [`BlockListReader::search_binary`] need two things: a
//! padded list (so ordinal `i` maps to a fixed offset) and a store with
//! positioned reads ([`ReadAt`]). The former is checked at runtime, the
//! latter at compile time.

use std::io::{Read, Seek, SeekFrom};
use std::marker::PhantomData;

use bytes::Buf;

use blockhouse_core::gzip::gunzip;
use blockhouse_core::{BlockRecord, Error, Result};

use crate::block::Block;
use crate::store::ReadAt;
use crate::{BLOCK_HEADER_LEN, BLOCK_LIST_V1, LIST_HEADER_LEN};

/// Where a search key falls relative to one decoded block.
///
/// Returned by the comparator handed to [`BlockListReader::search_linear`]
/// and [`BlockListReader::search_binary`].
///
/// The binary-search contract assumes blocks partition an ordered key
/// space: every block's keys are sorted, blocks are disjoint, and there
/// are no gaps inside a block's span. Under that contract `Missing` means
/// the key would have to be in this block and is not, so the search
/// terminates with not-found. Callers whose blocks hold sparse or
/// unordered keys must use the linear search instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The key precedes every entry in the block.
    Below,
    /// The key is one of the block's entries: a hit.
    Within,
    /// The key falls inside the block's span but is not present.
    Missing,
    /// The key follows every entry in the block.
    Above,
}

/// Block list decoder over a byte source.
///
/// `T` is the record type the list decodes to; the caller picks it at
/// construction and every data read rebuilds a fresh `T` from the stored
/// bytes.
pub struct BlockListReader<S, T> {
    store: S,
    version: u32,
    padded_block_size: u32,
    init_offset: u64,
    cur_offset: u64,
    end_offset: u64,
    cur_block: Option<Block>,
    _record: PhantomData<fn() -> T>,
}

impl<S: Read, T: BlockRecord> BlockListReader<S, T> {
    /// Open a block list in the window `[init_offset, end_offset)`.
    ///
    /// The store must already be positioned at `init_offset`; the list
    /// header is read from there. Padded mode requires the window to hold
    /// at least the list header.
    pub fn new(mut store: S, init_offset: u64, end_offset: u64) -> Result<Self> {
        let mut hdr = [0u8; LIST_HEADER_LEN as usize];
        store.read_exact(&mut hdr)?;

        let mut cursor = &hdr[..];
        let version = cursor.get_u32();
        if version != BLOCK_LIST_V1 {
            return Err(Error::UnsupportedVersion(version));
        }
        let padded_block_size = cursor.get_u32();
        if padded_block_size > 0 && padded_block_size <= BLOCK_HEADER_LEN {
            return Err(Error::ListInconsistent(format!(
                "padded block size {} cannot hold any payload (minimum {})",
                padded_block_size,
                BLOCK_HEADER_LEN + 1
            )));
        }

        let init_offset = init_offset + LIST_HEADER_LEN as u64;
        if padded_block_size > 0 && end_offset < init_offset {
            return Err(Error::ListInconsistent(format!(
                "end offset {} cannot precede the first block at {}",
                end_offset, init_offset
            )));
        }

        tracing::debug!(
            version,
            padded_block_size,
            init_offset,
            end_offset,
            "opened block list reader"
        );

        Ok(BlockListReader {
            store,
            version,
            padded_block_size,
            init_offset,
            cur_offset: init_offset,
            end_offset,
            cur_block: None,
            _record: PhantomData,
        })
    }

    /// Read the next block in sequence.
    ///
    /// Returns `Ok(None)` once the window is exhausted. Verifies that the
    /// decoded id follows the previously read block's id.
    pub fn read_next_block(&mut self) -> Result<Option<Block>> {
        if self.cur_offset >= self.end_offset {
            return Ok(None);
        }

        let remaining = self.end_offset - self.cur_offset;
        let block_bytes = if self.is_padded() {
            if u64::from(self.padded_block_size) > remaining {
                return Err(Error::ListInconsistent(format!(
                    "{} bytes left in the window, padded block needs {}",
                    remaining, self.padded_block_size
                )));
            }
            let mut buf = vec![0u8; self.padded_block_size as usize];
            self.store.read_exact(&mut buf)?;
            buf
        } else {
            let mut hdr = [0u8; BLOCK_HEADER_LEN as usize];
            self.store.read_exact(&mut hdr)?;
            let size = (&hdr[4..]).get_u32();
            if u64::from(BLOCK_HEADER_LEN) + u64::from(size) > remaining {
                return Err(Error::InsufficientData {
                    needed: BLOCK_HEADER_LEN as usize + size as usize,
                    got: remaining as usize,
                });
            }

            let mut buf = vec![0u8; BLOCK_HEADER_LEN as usize + size as usize];
            buf[..BLOCK_HEADER_LEN as usize].copy_from_slice(&hdr);
            self.store.read_exact(&mut buf[BLOCK_HEADER_LEN as usize..])?;
            buf
        };

        let block = Block::decode(self.padded_block_size, &block_bytes)?;

        if let Some(cur) = &self.cur_block {
            if block.id != cur.id + 1 {
                return Err(Error::UnexpectedBlockId {
                    expected: cur.id + 1,
                    found: block.id,
                });
            }
        }

        self.cur_offset += block_bytes.len() as u64;
        self.cur_block = Some(block.clone());
        Ok(Some(block))
    }

    /// Read the next block and decode its payload into a record.
    ///
    /// Returns the record together with the uncompressed payload length,
    /// or `Ok(None)` at the end of the window.
    pub fn read_next_block_data(&mut self) -> Result<Option<(T, usize)>> {
        match self.read_next_block()? {
            None => Ok(None),
            Some(block) => self.decode_block_data(&block.data).map(Some),
        }
    }

    /// Scan the whole list for a record the comparator places the key
    /// [`Placement::Within`].
    ///
    /// Works in both modes. Starts from the first block (the reader is
    /// reset), reads sequentially, and returns the first hit together with
    /// its uncompressed payload length, or `Ok(None)` when the list is
    /// exhausted.
    pub fn search_linear<Q: ?Sized, F>(
        &mut self,
        value: &Q,
        mut comparator: F,
    ) -> Result<Option<(T, usize)>>
    where
        S: Seek,
        F: FnMut(&Q, &T) -> Result<Placement>,
    {
        self.reset()?;

        loop {
            match self.read_next_block_data()? {
                None => return Ok(None),
                Some((record, size)) => {
                    if comparator(value, &record)? == Placement::Within {
                        return Ok(Some((record, size)));
                    }
                }
            }
        }
    }
}

impl<S: Seek, T> BlockListReader<S, T> {
    /// Reposition to the first block and clear the current block pointer.
    pub fn reset(&mut self) -> Result<()> {
        self.store.seek(SeekFrom::Start(self.init_offset))?;
        self.cur_offset = self.init_offset;
        self.cur_block = None;
        Ok(())
    }
}

impl<S, T: BlockRecord> BlockListReader<S, T> {
    /// Decode a block payload into a record. Needs no store capability, so
    /// both the sequential and positioned read paths share it.
    fn decode_block_data(&self, data: &[u8]) -> Result<(T, usize)> {
        // Unpadded lists gzip payloads on the wire; padded lists store
        // them raw.
        if self.is_padded() {
            let record = T::decode(data)?;
            Ok((record, data.len()))
        } else {
            let uncompressed = gunzip(data)?;
            let record = T::decode(&uncompressed)?;
            Ok((record, uncompressed.len()))
        }
    }
}

impl<S: ReadAt, T: BlockRecord> BlockListReader<S, T> {
    /// Read the block with ordinal `index` through a positioned read.
    ///
    /// Padded lists only. Does not disturb the sequential cursor.
    /// Verifies that the decoded id equals the requested index.
    pub fn read_block_at(&self, index: u32) -> Result<Block> {
        if !self.is_padded() {
            return Err(Error::NotSupported(
                "random access reads require a padded block list",
            ));
        }

        let span = self.end_offset - self.init_offset;
        let index_start = u64::from(self.padded_block_size) * u64::from(index);
        if index_start + u64::from(self.padded_block_size) > span {
            return Err(Error::InsufficientData {
                needed: self.padded_block_size as usize,
                got: span.saturating_sub(index_start) as usize,
            });
        }
        let offset = self.init_offset + index_start;

        let mut buf = vec![0u8; self.padded_block_size as usize];
        self.store.read_exact_at(&mut buf, offset)?;

        let block = Block::decode(self.padded_block_size, &buf)?;
        if block.id != index {
            return Err(Error::UnexpectedBlockId {
                expected: index,
                found: block.id,
            });
        }

        Ok(block)
    }

    /// Read block `index` and decode its payload into a record, returning
    /// the record and the payload length.
    pub fn read_block_data_at(&self, index: u32) -> Result<(T, usize)> {
        let block = self.read_block_at(index)?;
        self.decode_block_data(&block.data)
    }

    /// Binary search over a padded list whose records the comparator can
    /// order.
    ///
    /// Issues at most ⌈log₂ n⌉ + 1 block reads. See [`Placement`] for the
    /// ordering contract; [`Placement::Missing`] ends the search with
    /// not-found.
    pub fn search_binary<Q: ?Sized, F>(
        &self,
        value: &Q,
        mut comparator: F,
    ) -> Result<Option<(T, usize)>>
    where
        F: FnMut(&Q, &T) -> Result<Placement>,
    {
        if !self.is_padded() {
            return Err(Error::NotSupported(
                "binary search requires a padded block list",
            ));
        }

        let total = self.total_blocks()?;
        if total == 0 {
            return Ok(None);
        }
        tracing::trace!(total, "binary search over padded list");

        let mut left = 0u32;
        let mut right = total - 1;

        loop {
            let mid = left + (right - left) / 2;
            let (record, size) = self.read_block_data_at(mid)?;

            let placement = comparator(value, &record)?;
            match placement {
                Placement::Within => return Ok(Some((record, size))),
                // The key belongs in this block and is not there.
                Placement::Missing => return Ok(None),
                Placement::Below | Placement::Above => {
                    if left == right {
                        return Ok(None);
                    }
                    if placement == Placement::Below {
                        right = if mid > left { mid - 1 } else { left };
                    } else {
                        left = if mid < right { mid + 1 } else { right };
                    }
                }
            }
        }
    }
}

impl<S, T> BlockListReader<S, T> {
    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the reader and hand the store back. The reader never closes
    /// its store; disposing of it is the caller's job on every path.
    pub fn into_store(self) -> S {
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

    /// The last sequentially read block, if any.
    pub fn cur_block(&self) -> Option<&Block> {
        self.cur_block.as_ref()
    }

    /// Number of blocks in the window. Only computable in padded mode.
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

        if self.padded_block_size > 0 {
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
}
