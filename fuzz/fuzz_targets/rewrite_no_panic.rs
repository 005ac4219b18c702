//! The rewriter must terminate without panicking on arbitrary bytes, and
//! anything it accepts must be at least as long as the input.

#![no_main]

use html_namespacing::add_namespace_to_html;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(out) = add_namespace_to_html(data, "fuzz-ns") {
        assert!(out.len() >= data.len());
    }
});
