//! Misc Utilities
//!
//! Small helpers shared by the format crates and their callers: an
//! equal-key search over sorted integer slices, and the JSON marshal
//! wrappers used by JSON-backed [`crate::BlockRecord`] impls.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Find the index of `key` in a sorted `u64` slice.
///
/// Returns `None` when the key is absent. The slice must be sorted
/// ascending; duplicate keys return one of the matching indices.
pub fn binary_search_u64(sorted: &[u64], key: u64) -> Option<usize> {
    sorted.binary_search(&key).ok()
}

/// Marshal a value to JSON bytes.
pub fn to_json_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Unmarshal a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}
