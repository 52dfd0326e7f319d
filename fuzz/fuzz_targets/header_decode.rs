#![no_main]

use libfuzzer_sys::fuzz_target;

use blockhouse_headers::{deserialize_cipher_hdr, deserialize_plain_hdr};

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to both header decoders. Every outcome must be
    // a clean parse, an incomplete signal, or a typed error:
    // - truncated prefixes and bodies
    // - unknown versions and body type tags
    // - wrong prime sentinels
    // - corrupted gzip bodies
    if let Ok(Some((hdr, consumed))) = deserialize_plain_hdr(data) {
        assert!(consumed <= data.len());
        assert_eq!(hdr.hdr_len as usize, hdr.body.len());
    }

    if let Ok(Some((hdr, consumed))) = deserialize_cipher_hdr(data) {
        assert!(consumed <= data.len());
        assert_eq!(hdr.hdr_len as usize, hdr.body.len());
    }
});
