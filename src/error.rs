//! Error types for namespacing operations

use std::fmt;

use libc::c_int;

/// Errors that can occur while adding a namespace to HTML
///
/// There are exactly two failure kinds. Callers are expected to surface
/// `BadlyFormedHtml` as a validation error and `OutOfMemory` as a resource
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacingError {
    /// The input failed the end-of-input validity checks (unbalanced tags,
    /// unterminated attribute value, comment, CDATA or declaration)
    BadlyFormedHtml(String),
    /// The allocation strategy could not satisfy a buffer growth request
    OutOfMemory,
}

impl NamespacingError {
    /// Get the errno-style code used at the C boundary
    pub fn code(&self) -> c_int {
        match self {
            NamespacingError::BadlyFormedHtml(_) => libc::EINVAL,
            NamespacingError::OutOfMemory => libc::ENOMEM,
        }
    }

    /// Whether this error was caused by the input rather than by resources
    pub fn is_badly_formed(&self) -> bool {
        matches!(self, NamespacingError::BadlyFormedHtml(_))
    }
}

impl fmt::Display for NamespacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespacingError::BadlyFormedHtml(msg) => write!(f, "Badly-formed HTML: {}", msg),
            NamespacingError::OutOfMemory => write!(f, "Out of memory while building output"),
        }
    }
}

impl std::error::Error for NamespacingError {}
