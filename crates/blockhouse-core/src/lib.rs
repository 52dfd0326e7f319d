//! # blockhouse-core
//!
//! Shared foundation for the blockhouse container formats:
//!
//! - [`error`]: the unified error taxonomy used by every crate in the
//!   workspace. The only error callers are expected to recover from locally
//!   is [`Error::PaddingViolation`] (by chunking the record); everything
//!   else propagates.
//! - [`gzip`]: gzip encode/decode of opaque byte buffers, used for
//!   variable-sized block payloads and gzipped header bodies.
//! - [`record`]: the [`BlockRecord`] trait connecting application payloads
//!   to the block list writer/reader.
//! - [`util`]: sorted-slice search and JSON marshal helpers.

pub mod error;
pub mod gzip;
pub mod record;
pub mod util;

pub use error::{Error, Result};
pub use record::BlockRecord;
