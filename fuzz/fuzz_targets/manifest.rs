//! Fuzz target for the manifest parser.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_manifest
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use pgmigrator_core::parse_manifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let names = parse_manifest(input);

        for name in &names {
            assert!(!name.is_empty());
            assert_eq!(name.trim(), name);
            assert!(!name.starts_with('#'));
            assert!(!name.contains('\n'));
        }

        // Parsing the joined output is a fixed point
        assert_eq!(parse_manifest(&names.join("\n")), names);
    }
});
