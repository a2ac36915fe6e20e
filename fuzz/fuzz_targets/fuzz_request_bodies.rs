//! Fuzz target: request body and config parsing
//!
//! Feeds arbitrary bytes to the `/dispense` body decoder and to the config
//! loader.  Neither may panic; a config that parses and validates must
//! keep its poll budget and bus address inside the accepted ranges.
//!
//! cargo fuzz run fuzz_request_bodies

#![no_main]

use libfuzzer_sys::fuzz_target;
use sweetrivia_dispenser::config::HostConfig;
use sweetrivia_dispenser::http::types::DispenseRequest;
use sweetrivia_dispenser::protocol::CandySelection;

fuzz_target!(|data: &[u8]| {
    if let Ok(req) = serde_json::from_slice::<DispenseRequest>(data) {
        let token = req.candy_type.unwrap_or_default();
        let _ = CandySelection::from_token(&token);
    }

    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = HostConfig::from_json(raw) {
        if config.validate().is_ok() {
            assert!(config.dispenser.max_attempts >= 1);
            assert!(config.dispenser.poll_interval_ms >= 1);
            assert!((0x03..=0x77).contains(&config.dispenser.device_address));
        }
    }
});
