//! Tags that never receive a namespace class
//!
//! Document-structural elements (the root, the head and everything that
//! normally lives in it) never receive a new `class` attribute. An existing
//! `class` value on a top-level one is still extended. Matching is byte-exact
//! and therefore case-sensitive: `<HTML>` is namespaced, `<html>` is not.

/// Structural tags exempt from namespacing
pub const IGNORE_TAGS: &[&str] = &[
    "html", "head", "base", "meta", "title", "link", "script", "noscript", "style",
];

/// Check whether a tag name is exempt from namespacing
///
/// # Examples
///
/// ```
/// use html_namespacing::ignore::should_ignore_tag;
///
/// assert!(should_ignore_tag(b"script"));
/// assert!(!should_ignore_tag(b"div"));
/// assert!(!should_ignore_tag(b"SCRIPT"));
/// ```
pub fn should_ignore_tag(tag_name: &[u8]) -> bool {
    IGNORE_TAGS.iter().any(|tag| tag.as_bytes() == tag_name)
}
