//! FFI (Foreign Function Interface) layer for C integration
//!
//! This module exposes the rewriter to C and to host-language extensions
//! (interpreter bindings that want to hand their own allocator to the
//! engine).
//!
//! # FFI Boundary Contract
//!
//! ## Inputs
//!
//! - `html` is bytes + length. It is NOT required to be NUL-terminated and
//!   may contain NUL bytes, which are copied like any other byte.
//! - `ns` is a NUL-terminated C string holding the namespace token.
//!
//! ## Output
//!
//! On success `*ret` points at `*ret_len` bytes of namespaced HTML,
//! followed by a single NUL byte that is NOT counted in `*ret_len`. The
//! memory was obtained from the allocation strategy passed in (or from
//! `malloc` for `add_namespace_to_html_with_length`) and is owned by the
//! caller, who releases it with the matching `free`.
//!
//! On failure `*ret` is NULL and `*ret_len` is 0. Nothing is leaked: the
//! partially built buffer has already been released through the strategy.
//!
//! ## Return Codes
//!
//! - `0`: success
//! - `EINVAL`: badly formed HTML, or a NULL `ns`/`ret`/`ret_len` pointer, or a
//!   NULL `html` with a non-zero length
//! - `ENOMEM`: the allocation strategy failed
//! - `HTML_NAMESPACING_ERROR_INTERNAL` (-1): a Rust panic was caught
//!
//! ## Example (C)
//!
//! ```c
//! char *out;
//! size_t out_len;
//! int rv = add_namespace_to_html_with_length(html, html_len, "users-show", &out, &out_len);
//! if (rv == 0) {
//!     write(fd, out, out_len);
//!     html_namespacing_free(out);
//! } else if (rv == EINVAL) {
//!     log_error("badly formed HTML");
//! }
//! ```
//!
//! ## Panic Safety
//!
//! Every entry point catches panics with `catch_unwind`; C never sees Rust
//! unwinding.
//!
//! ## Thread Safety
//!
//! There is no shared state. Calls may run concurrently from any number of
//! threads as long as the allocation strategy itself is thread-safe.

use std::ffi::CStr;
use std::panic;
use std::ptr::{self, NonNull};
use std::slice;

use libc::{c_char, c_int, c_void};
use log::debug;

use crate::alloc::AllocationStrategy;
use crate::namespacer::rewrite;

// ============================================================================
// Return Code Constants
// ============================================================================

/// Success - `*ret` holds the namespaced HTML
pub const HTML_NAMESPACING_OK: c_int = 0;

/// Badly formed HTML or invalid argument
pub const HTML_NAMESPACING_EINVAL: c_int = libc::EINVAL;

/// Allocation strategy failed
pub const HTML_NAMESPACING_ENOMEM: c_int = libc::ENOMEM;

/// Internal error (panic caught)
pub const HTML_NAMESPACING_ERROR_INTERNAL: c_int = -1;

// ============================================================================
// FFI Data Structures
// ============================================================================

/// Allocation strategy passed from C
///
/// Three function pointers with the semantics of C's `malloc`, `free` and
/// `realloc`: failure is signalled by NULL, and `realloc` preserves the
/// existing bytes and leaves the old block valid when it fails.
///
/// # Example Usage (C)
///
/// ```c
/// HtmlNamespacingAllocationStrategy strategy = {
///     .malloc = pool_malloc,
///     .free = pool_free,
///     .realloc = pool_realloc,
/// };
/// rv = add_namespace_to_html_with_length_and_allocation_strategy(
///         html, html_len, ns, &out, &out_len, strategy);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HtmlNamespacingAllocationStrategy {
    pub malloc: unsafe extern "C" fn(size: usize) -> *mut c_void,
    pub free: unsafe extern "C" fn(ptr: *mut c_void),
    pub realloc: unsafe extern "C" fn(ptr: *mut c_void, size: usize) -> *mut c_void,
}

impl HtmlNamespacingAllocationStrategy {
    /// The process heap: libc `malloc`, `free`, `realloc`
    pub fn system() -> Self {
        Self {
            malloc: libc::malloc,
            free: libc::free,
            realloc: libc::realloc,
        }
    }
}

impl Default for HtmlNamespacingAllocationStrategy {
    fn default() -> Self {
        Self::system()
    }
}

impl AllocationStrategy for HtmlNamespacingAllocationStrategy {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        // SAFETY: whoever built this struct vouches that `malloc` behaves
        // like C's malloc.
        NonNull::new(unsafe { (self.malloc)(size.max(1)) }.cast::<u8>())
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
        // SAFETY: `ptr` came from this strategy (caller contract) and
        // `realloc` behaves like C's realloc.
        NonNull::new(unsafe { (self.realloc)(ptr.as_ptr().cast(), new_size.max(1)) }.cast::<u8>())
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        // SAFETY: `ptr` came from this strategy and is released once.
        unsafe { (self.free)(ptr.as_ptr().cast()) }
    }
}

fn required_bytes<'a>(ptr: *const c_char, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }

    if ptr.is_null() {
        return None;
    }

    // SAFETY: Pointer was validated as non-NULL above; caller guarantees `len`
    // bytes are valid and readable for the duration of this call.
    Some(unsafe { slice::from_raw_parts(ptr.cast::<u8>(), len) })
}

fn required_c_str<'a>(ptr: *const c_char) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }

    // SAFETY: Pointer is non-NULL and caller guarantees a NUL-terminated
    // string that outlives this call.
    Some(unsafe { CStr::from_ptr(ptr) }.to_bytes())
}

// ============================================================================
// FFI Functions
// ============================================================================

/// Add a namespace class to top-level elements, allocating with `malloc`
///
/// Release the result with `html_namespacing_free()` (or `free()`).
///
/// # Safety
///
/// - `html` must point to `html_len` readable bytes (may be NULL when
///   `html_len == 0`)
/// - `ns` must be NULL or a valid NUL-terminated string
/// - `ret` and `ret_len` must be NULL or valid for writes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn add_namespace_to_html_with_length(
    html: *const c_char,
    html_len: usize,
    ns: *const c_char,
    ret: *mut *mut c_char,
    ret_len: *mut usize,
) -> c_int {
    // SAFETY: same contract as this function.
    unsafe {
        add_namespace_to_html_with_length_and_allocation_strategy(
            html,
            html_len,
            ns,
            ret,
            ret_len,
            HtmlNamespacingAllocationStrategy::system(),
        )
    }
}

/// Add a namespace class to top-level elements, allocating through
/// `allocation_strategy`
///
/// # Behavior
///
/// **On Success:**
/// - returns `HTML_NAMESPACING_OK`
/// - `*ret` points to the output, allocated by `allocation_strategy.malloc`
///   or `.realloc`; release it with `allocation_strategy.free`
/// - `*ret_len` is the output length, excluding the trailing NUL
///
/// **On Error:**
/// - returns `EINVAL`, `ENOMEM` or `HTML_NAMESPACING_ERROR_INTERNAL`
/// - `*ret` is NULL and `*ret_len` is 0 (when those pointers are non-NULL)
///
/// # Safety
///
/// - `html` must point to `html_len` readable bytes (may be NULL when
///   `html_len == 0`)
/// - `ns` must be NULL or a valid NUL-terminated string
/// - `ret` and `ret_len` must be NULL or valid for writes
/// - the three function pointers must follow C `malloc`/`free`/`realloc`
///   semantics
#[unsafe(no_mangle)]
pub unsafe extern "C" fn add_namespace_to_html_with_length_and_allocation_strategy(
    html: *const c_char,
    html_len: usize,
    ns: *const c_char,
    ret: *mut *mut c_char,
    ret_len: *mut usize,
    allocation_strategy: HtmlNamespacingAllocationStrategy,
) -> c_int {
    // Validate output pointers first so we can report through them.
    if ret.is_null() || ret_len.is_null() {
        debug!("rejecting call with NULL output pointer");
        return HTML_NAMESPACING_EINVAL;
    }

    // SAFETY: `ret` and `ret_len` were validated as non-NULL above.
    unsafe {
        *ret = ptr::null_mut();
        *ret_len = 0;
    }

    let Some(html) = required_bytes(html, html_len) else {
        debug!("rejecting call with NULL html and length {}", html_len);
        return HTML_NAMESPACING_EINVAL;
    };
    let Some(ns) = required_c_str(ns) else {
        debug!("rejecting call with NULL namespace");
        return HTML_NAMESPACING_EINVAL;
    };

    // Catch any panics to prevent unwinding into C code.
    let outcome = panic::catch_unwind(|| rewrite(html, ns, allocation_strategy));

    match outcome {
        Ok(Ok(namespaced)) => {
            let (out, out_len, _) = namespaced.into_raw_parts();
            // SAFETY: validated as non-NULL above.
            unsafe {
                *ret = out.as_ptr().cast::<c_char>();
                *ret_len = out_len;
            }
            HTML_NAMESPACING_OK
        }
        Ok(Err(e)) => e.code(),
        Err(_) => HTML_NAMESPACING_ERROR_INTERNAL,
    }
}

/// Release a result of `add_namespace_to_html_with_length`
///
/// NULL is a no-op. Do NOT use this for results allocated through a custom
/// strategy; use that strategy's `free`.
///
/// # Safety
///
/// `ptr` must be NULL or a result of `add_namespace_to_html_with_length`
/// that has not been released yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn html_namespacing_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: the block was allocated by libc malloc/realloc.
    unsafe { libc::free(ptr.cast::<c_void>()) };
}
