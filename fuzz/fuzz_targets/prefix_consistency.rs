//! Accepted input stays accepted, with the same output, when a balanced
//! element is appended.

#![no_main]

use html_namespacing::add_namespace_to_html;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(first) = add_namespace_to_html(data, "ns") else {
        return;
    };

    let mut extended = data.to_vec();
    extended.extend_from_slice(b"<p>tail</p>");
    let second = add_namespace_to_html(&extended, "ns").expect("balanced suffix accepted");

    let mut expected = first.as_bytes().to_vec();
    expected.extend_from_slice(b"<p class=\"ns\">tail</p>");
    assert_eq!(second.as_bytes(), expected.as_slice());
});
