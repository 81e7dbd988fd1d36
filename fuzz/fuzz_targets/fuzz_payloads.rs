//! Fuzz testing for request payload deserialization.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_payloads -- -max_total_time=60
//! ```
//!
//! - Arbitrary JSON bodies never panic the model deserializers
//! - Accepted analysis options survive re-serialization

#![no_main]

use libfuzzer_sys::fuzz_target;
use devkit_gateway::models::{AnalysisRequest, TodoItem};

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = serde_json::from_slice::<AnalysisRequest>(data) {
        let encoded = serde_json::to_vec(&request.options).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&encoded).is_ok());
    }

    let _ = serde_json::from_slice::<TodoItem>(data);
});
