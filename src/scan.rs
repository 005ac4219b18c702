//! Byte-level scanning helpers
//!
//! Structure is recognized on ASCII bytes only. Every delimiter the rewriter
//! looks for (`<`, `>`, `=`, quotes, `-`, `]`, `/`, whitespace) is ASCII, and
//! ASCII bytes never occur inside a multi-byte UTF-8 sequence, so cutting the
//! input at any of these positions never splits a character.

use memchr::{memchr, memchr2};

/// HTML whitespace as the rewriter understands it: space, tab, CR, LF
#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Length of the UTF-8 sequence introduced by `first_byte`
///
/// Continuation and invalid lead bytes count as one byte so the cursor
/// always makes progress.
#[inline]
pub fn utf8_char_len(first_byte: u8) -> usize {
    match first_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// Position of the next `needle` at or after `from`, or `html.len()`
#[inline]
pub fn find_byte(html: &[u8], from: usize, needle: u8) -> usize {
    memchr(needle, &html[from..]).map_or(html.len(), |i| from + i)
}

/// Position of the next `a` or `b` at or after `from`, or `html.len()`
#[inline]
pub fn find_either(html: &[u8], from: usize, a: u8, b: u8) -> usize {
    memchr2(a, b, &html[from..]).map_or(html.len(), |i| from + i)
}

/// Position of the end of a tag name: whitespace, `>` or `/`
#[inline]
pub fn find_tag_name_end(html: &[u8], from: usize) -> usize {
    html[from..]
        .iter()
        .position(|&b| is_whitespace(b) || b == b'>' || b == b'/')
        .map_or(html.len(), |i| from + i)
}

/// Advance past one character starting at `from`, clamped to the input
#[inline]
pub fn next_char_boundary(html: &[u8], from: usize) -> usize {
    match html.get(from) {
        Some(&b) => (from + utf8_char_len(b)).min(html.len()),
        None => html.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace() {
        for b in [b' ', b'\t', b'\r', b'\n'] {
            assert!(is_whitespace(b));
        }
        assert!(!is_whitespace(b'a'));
        assert!(!is_whitespace(0x0c));
        assert!(!is_whitespace(0xa0));
    }

    #[test]
    fn test_utf8_char_len() {
        assert_eq!(utf8_char_len(b'a'), 1);
        assert_eq!(utf8_char_len("é".as_bytes()[0]), 2);
        assert_eq!(utf8_char_len("€".as_bytes()[0]), 3);
        assert_eq!(utf8_char_len("𝞪".as_bytes()[0]), 4);
        assert_eq!(utf8_char_len(0x80), 1);
        assert_eq!(utf8_char_len(0xFF), 1);
    }

    #[test]
    fn test_find_helpers_return_len_when_missing() {
        let html = b"abc<def";
        assert_eq!(find_byte(html, 0, b'<'), 3);
        assert_eq!(find_byte(html, 4, b'<'), html.len());
        assert_eq!(find_either(b"x='y'", 0, b'\'', b'"'), 2);
        assert_eq!(find_either(b"xyz", 1, b'\'', b'"'), 3);
        assert_eq!(find_tag_name_end(b"div class", 0), 3);
        assert_eq!(find_tag_name_end(b"br/>", 0), 2);
        assert_eq!(find_tag_name_end(b"span", 0), 4);
    }

    #[test]
    fn test_next_char_boundary_clamps() {
        let html = "a𝞪".as_bytes();
        assert_eq!(next_char_boundary(html, 0), 1);
        assert_eq!(next_char_boundary(html, 1), 5);
        assert_eq!(next_char_boundary(html, 5), 5);
        // Truncated sequence at end of input
        assert_eq!(next_char_boundary(&html[..3], 1), 3);
    }
}
