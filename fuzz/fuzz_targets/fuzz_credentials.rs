//! Fuzz testing for credential extraction and allow-list matching.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_credentials -- -max_total_time=60
//! ```
//!
//! Checks that arbitrary `Authorization` / `X-API-Key` values never panic,
//! that an extracted credential is never empty, and that the allow-list
//! accepts exactly its own entries.

#![no_main]

use arbitrary::Arbitrary;
use axum::http::{HeaderMap, HeaderValue};
use libfuzzer_sys::fuzz_target;
use devkit_gateway::middleware::{AllowList, extract_credential};

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    authorization: Option<&'a [u8]>,
    api_key: Option<&'a [u8]>,
    allowed: Vec<&'a str>,
    candidate: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let mut headers = HeaderMap::new();
    if let Some(value) = input.authorization.and_then(|v| HeaderValue::from_bytes(v).ok()) {
        headers.insert("authorization", value);
    }
    if let Some(value) = input.api_key.and_then(|v| HeaderValue::from_bytes(v).ok()) {
        headers.insert("x-api-key", value);
    }

    if let Some(credential) = extract_credential(&headers) {
        assert!(!credential.is_empty());
    }

    let allow_list = AllowList::new(input.allowed.iter().copied(), None);
    let listed = !input.candidate.is_empty() && input.allowed.contains(&input.candidate);
    assert_eq!(allow_list.accepts(input.candidate), listed);
});
