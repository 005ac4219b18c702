//! Drive the C entry point with arbitrary HTML and a namespace taken from
//! the first bytes of the input.

#![no_main]

use std::ffi::CString;
use std::ptr;

use html_namespacing::ffi::{
    HTML_NAMESPACING_EINVAL, HTML_NAMESPACING_OK, add_namespace_to_html_with_length,
    html_namespacing_free,
};
use libc::c_char;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(0);
    let (ns, html) = data.split_at(split);
    let Ok(ns) = CString::new(ns) else {
        return;
    };

    let mut out: *mut c_char = ptr::null_mut();
    let mut out_len: usize = 0;
    let rv = unsafe {
        add_namespace_to_html_with_length(
            html.as_ptr().cast(),
            html.len(),
            ns.as_ptr(),
            &mut out,
            &mut out_len,
        )
    };

    match rv {
        HTML_NAMESPACING_OK => {
            assert!(!out.is_null());
            assert!(out_len >= html.len());
            assert_eq!(unsafe { *out.add(out_len) }, 0);
            unsafe { html_namespacing_free(out) };
        }
        HTML_NAMESPACING_EINVAL => assert!(out.is_null()),
        other => panic!("unexpected return code {other}"),
    }
});
