//! Search Integration Tests
//!
//! Builds a padded list of sorted u64 keys packed into JSON blocks, then
//! cross-checks linear and binary search on hits, in-range misses, and
//! out-of-range probes. A counting store verifies the binary search's
//! logarithmic read bound.

use std::cell::Cell;
use std::io::{Cursor, Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};

use blockhouse_blocks::{
    BlockListReader, BlockListWriter, BlockRecord, Placement, ReadAt, Result,
};
use blockhouse_core::util;

const PADDED_BLOCK_SIZE: u32 = 1024;
const START: u64 = 10;
const END: u64 = 20_000;

/// One block's worth of sorted keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KeyBlock {
    keys: Vec<u64>,
}

impl BlockRecord for KeyBlock {
    fn encode(&self) -> Result<Vec<u8>> {
        util::to_json_vec(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        util::from_json_slice(bytes)
    }
}

/// Place a key against a block of sorted keys.
fn compare(value: &u64, block: &KeyBlock) -> Result<Placement> {
    if *value < block.keys[0] {
        return Ok(Placement::Below);
    }
    if *value > *block.keys.last().unwrap() {
        return Ok(Placement::Above);
    }
    if util::binary_search_u64(&block.keys, *value).is_some() {
        Ok(Placement::Within)
    } else {
        Ok(Placement::Missing)
    }
}

/// Pack the keys `START*10, (START+1)*10, .., (END-1)*10` into blocks that
/// fill (but never overflow) the padded size, the same way a writer that
/// size-checks with `serialize_block_data` would.
fn build_sorted_list() -> Vec<u8> {
    let mut sink = Vec::new();
    let mut writer = BlockListWriter::new(&mut sink, PADDED_BLOCK_SIZE, 0).unwrap();

    let mut block = KeyBlock { keys: Vec::new() };
    for v in START..END {
        block.keys.push(v * 10);
        if writer.serialize_block_data(&block).unwrap().len() > writer.max_data_size() as usize {
            let overflow = block.keys.pop().unwrap();
            writer.write_block_data(&block).unwrap();
            block = KeyBlock {
                keys: vec![overflow],
            };
        }
    }
    if !block.keys.is_empty() {
        writer.write_block_data(&block).unwrap();
    }

    drop(writer);
    sink
}

fn open_reader(data: Vec<u8>) -> BlockListReader<Cursor<Vec<u8>>, KeyBlock> {
    let end = data.len() as u64;
    BlockListReader::new(Cursor::new(data), 0, end).unwrap()
}

fn assert_both_searches(
    reader: &mut BlockListReader<Cursor<Vec<u8>>, KeyBlock>,
    value: u64,
    should_exist: bool,
) {
    let linear = reader.search_linear(&value, compare).unwrap();
    let binary = reader.search_binary(&value, compare).unwrap();

    match (&linear, &binary) {
        (Some((lin, _)), Some((bin, _))) => {
            assert!(should_exist, "{value} found but should not exist");
            assert_eq!(lin, bin, "searches disagree for {value}");
            assert!(util::binary_search_u64(&lin.keys, value).is_some());
        }
        (None, None) => assert!(!should_exist, "{value} not found but should exist"),
        _ => panic!(
            "linear ({}) and binary ({}) disagree for {value}",
            linear.is_some(),
            binary.is_some()
        ),
    }
}

#[test]
fn test_linear_and_binary_agree() {
    let mut reader = open_reader(build_sorted_list());
    assert!(reader.total_blocks().unwrap() > 8);

    // Below the smallest key.
    for v in (START.saturating_sub(20)..START).rev() {
        assert_both_searches(&mut reader, v * 10, false);
    }

    // Above the largest key.
    for v in END..END + 20 {
        assert_both_searches(&mut reader, v * 10, false);
    }

    // In range but never written (not divisible by 10).
    for i in 0..50 {
        let v = START + (i * 397) % (END - START);
        assert_both_searches(&mut reader, v * 10 + 5, false);
    }

    // Present keys.
    for i in 0..50 {
        let v = START + (i * 631) % (END - START);
        assert_both_searches(&mut reader, v * 10, true);
    }
}

#[test]
fn test_binary_search_far_out_of_range() {
    let reader = open_reader(build_sorted_list());
    assert!(reader.search_binary(&0u64, compare).unwrap().is_none());
    assert!(reader
        .search_binary(&10_000_000u64, compare)
        .unwrap()
        .is_none());
}

#[test]
fn test_linear_search_finds_first_key() {
    let mut reader = open_reader(build_sorted_list());
    let (block, _) = reader.search_linear(&(START * 10), compare).unwrap().unwrap();
    assert_eq!(block.keys[0], START * 10);
}

// ---------------------------------------------------------------
// Read-count bound
// ---------------------------------------------------------------

/// A store that counts positioned block reads.
struct CountingStore {
    cursor: Cursor<Vec<u8>>,
    reads: Cell<u32>,
}

impl CountingStore {
    fn new(data: Vec<u8>) -> Self {
        CountingStore {
            cursor: Cursor::new(data),
            reads: Cell::new(0),
        }
    }
}

impl Read for CountingStore {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for CountingStore {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl ReadAt for CountingStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        self.reads.set(self.reads.get() + 1);
        self.cursor.read_at(buf, offset)
    }
}

#[test]
fn test_binary_search_read_bound() {
    let data = build_sorted_list();
    let end = data.len() as u64;
    let reader: BlockListReader<CountingStore, KeyBlock> =
        BlockListReader::new(CountingStore::new(data), 0, end).unwrap();

    let total = reader.total_blocks().unwrap();
    let bound = 32 - (total - 1).leading_zeros() + 1; // ceil(log2 n) + 1

    let probes = [
        START * 10,
        (END - 1) * 10,
        (START + (END - START) / 2) * 10,
        (START + (END - START) / 3) * 10 + 5, // in-range miss
        1,                                    // below everything
        u64::MAX,                             // above everything
    ];

    for value in probes {
        reader.store().reads.set(0);
        let _ = reader.search_binary(&value, compare).unwrap();
        let reads = reader.store().reads.get();
        assert!(
            reads <= bound,
            "search for {value} took {reads} reads, bound is {bound}"
        );
    }
}
