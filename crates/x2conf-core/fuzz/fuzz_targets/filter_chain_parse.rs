//! Fuzzing target for filter chain and field path parsing
//!
//! Arbitrary expression text must either parse or produce an error; the
//! quote and parenthesis aware splitter must never panic on unbalanced input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use x2conf_core::conversion::filter::{split_top_level, FilterChain};
use x2conf_core::conversion::source::{FieldPath, DEFAULT_NAMESPACE};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let _ = FilterChain::parse(&text);
    let _ = split_top_level(&text, '|');
    let _ = split_top_level(&text, ',');

    // Path segments with odd brackets and indices
    let path = FieldPath::parse(&text, DEFAULT_NAMESPACE);
    let _ = path.normalized();
});
