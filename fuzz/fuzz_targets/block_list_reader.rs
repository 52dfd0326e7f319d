#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;

use blockhouse_blocks::BlockListReader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the block list reader. The reader should
    // reject malformed input with typed errors, never panic:
    // - truncated list headers and blocks
    // - absurd padded block sizes and size fields
    // - broken id chains
    // - gzip garbage in unpadded payloads
    let end = data.len() as u64;
    let store = Cursor::new(data.to_vec());

    let Ok(mut reader) = BlockListReader::<_, Vec<u8>>::new(store, 0, end) else {
        return;
    };

    let _ = reader.total_blocks();

    // Bounded sequential walk; the id chain check stops runaway input.
    for _ in 0..64 {
        match reader.read_next_block_data() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    if reader.is_padded() {
        if let Ok(total) = reader.total_blocks() {
            let _ = reader.read_block_at(0);
            if total > 0 {
                let _ = reader.read_block_at(total - 1);
            }
            let _ = reader.read_block_at(u32::MAX);
        }
    }
});
