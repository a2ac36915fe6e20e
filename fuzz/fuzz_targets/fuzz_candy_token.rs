//! Fuzz target: `CandySelection::from_token`
//!
//! Arbitrary UTF-8 must never panic, and anything that maps must map back
//! to the exact same token and a code in 1..=4.
//!
//! cargo fuzz run fuzz_candy_token

#![no_main]

use libfuzzer_sys::fuzz_target;
use sweetrivia_dispenser::protocol::CandySelection;

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(selection) = CandySelection::from_token(token) {
        assert_eq!(selection.token(), token);
        assert!((1..=4).contains(&selection.code()));
        assert_ne!(selection.code(), 0xAA, "a selection code must never look like an ack");
    }

    let parsed: Result<CandySelection, _> = token.parse();
    assert_eq!(parsed.ok(), CandySelection::from_token(token));
});
