//! HTML Namespacing - streaming namespace-class rewriter
//!
//! This library adds a CSS class (the "namespace") to every top-level
//! element of an HTML fragment, so that styles and scripts written for one
//! template cannot leak into another. It is a single forward pass over the
//! input bytes: no DOM, no backtracking, amortized linear output growth.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `namespacer`: the lexical state machine and public entry points
//! - `buffer`: growable output buffer and the owned result type
//! - `alloc`: pluggable allocation strategy (process heap by default)
//! - `ignore`: structural tags that are never namespaced
//! - `scan`: ASCII/UTF-8 byte scanning helpers
//! - `template`: per-template namespacing for web frameworks
//! - `ffi`: C-compatible interface with caller-supplied allocators
//! - `error`: the two failure kinds
//!
//! # Example
//!
//! ```
//! use html_namespacing::add_namespace_to_html;
//!
//! let out = add_namespace_to_html(b"<p class=\"below\">Goodbye</p>", "foo")?;
//! assert_eq!(out.as_bytes(), &b"<p class=\"below foo\">Goodbye</p>"[..]);
//! # Ok::<(), html_namespacing::NamespacingError>(())
//! ```
//!
//! # Safety
//!
//! The output buffer is managed through raw pointers so that any
//! malloc-compatible allocator can back it. All unsafe code is confined to
//! `alloc`, `buffer` and `ffi` and documents its invariants.

// Module declarations
pub mod alloc;
pub mod buffer;
pub mod error;
pub mod ffi;
pub mod ignore;
pub mod namespacer;
pub mod scan;
pub mod template;

// Re-export main types for convenience
pub use crate::alloc::{AllocationStrategy, SystemHeap};
pub use buffer::NamespacedHtml;
pub use error::NamespacingError;
pub use namespacer::{
    add_namespace_to_html, add_namespace_to_html_with_strategy, add_namespace_to_optional_html,
};
pub use template::{TemplateNamespacer, TemplateOptions};
