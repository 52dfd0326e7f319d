//! Padded Block List Format
//!
//! This crate implements the binary format for storing a sequence of
//! application records as a single byte stream, either with every block
//! padded to an identical on-disk size (enabling O(log n) random access
//! and binary search by ordinal) or with variable-sized, gzip-compressed
//! blocks optimized for sequential scanning.
//!
//! ## List File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ List header (8 bytes)                                        │
//! │ - Version: 1 (4 bytes)                                       │
//! │ - Padded block size (4 bytes, 0 = unpadded)                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Block 0                                                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Block 1                                                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ ...                                                          │
//! └──────────────────────────────────────────────────────────────┘
//!
//! Block (both modes):
//! ┌───────────┬───────────┬──────────────┬────────────────────────┐
//! │ id        │ size      │ data         │ random padding         │
//! │ (4 bytes) │ (4 bytes) │ (size bytes) │ (padded mode only)     │
//! └───────────┴───────────┴──────────────┴────────────────────────┘
//! ```
//!
//! All integers are big-endian. In padded mode every block occupies
//! exactly `padded_block_size` bytes on disk, so block `i` always starts
//! at `init_offset + i * padded_block_size` and the total block count is
//! the byte span divided by the padded size. The trailing padding is
//! filled with OS-entropy random bytes, so consumers can never come to
//! depend on its content. In unpadded mode each block is sized exactly to
//! its payload and the payload is gzipped on the wire.
//!
//! A list may be embedded anywhere inside a larger file: both the writer
//! and the reader take the absolute offset at which the caller positioned
//! the store, and all arithmetic is relative to it.
//!
//! ## Why Padding?
//!
//! Fixed-size blocks buy ordinal addressing: no index structure is needed
//! to seek to block `i`, and if the application keeps its records sorted
//! across blocks, [`BlockListReader::search_binary`] finds a record in at
//! most ⌈log₂ n⌉ + 1 block reads. The price is the per-block size ceiling:
//! writing a record larger than [`BlockListWriter::max_data_size`] fails
//! with a typed padding violation, and the caller splits the record into
//! chunks and writes each as its own block.
//!
//! ## Usage
//!
//! ### Writing
//! ```ignore
//! let mut writer = BlockListWriter::new(&mut file, 1024, 0)?;
//! for record in records {
//!     writer.write_block_data(&record)?;
//! }
//! ```
//!
//! ### Reading
//! ```ignore
//! let mut reader: BlockListReader<_, MyRecord> =
//!     BlockListReader::new(file, 0, file_len)?;
//! while let Some((record, _len)) = reader.read_next_block_data()? {
//!     process(record);
//! }
//! ```

pub mod block;
pub mod reader;
pub mod store;
pub mod writer;

pub use blockhouse_core::{BlockRecord, Error, Result};

pub use block::Block;
pub use reader::{BlockListReader, Placement};
pub use store::ReadAt;
pub use writer::BlockListWriter;

/// Block list format version 1.
pub const BLOCK_LIST_V1: u32 = 1;

/// Current block list format version.
pub const BLOCK_LIST_CUR_V: u32 = BLOCK_LIST_V1;

/// List header length: version + padded block size.
pub const LIST_HEADER_LEN: u32 = 8;

/// Block header length: id + size.
pub const BLOCK_HEADER_LEN: u32 = 8;
