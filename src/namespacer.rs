//! Single-pass namespace rewriter
//!
//! Adds a CSS class to every top-level element of an HTML fragment without
//! building a tree. A lexical state machine walks the input once, tracking
//! tag nesting depth, attribute quoting, comments, CDATA sections, doctype
//! and XML declarations. Output is only mutated at depth 0.
//!
//! # Algorithm
//!
//! The input is copied lazily: the rewriter remembers the last position it
//! flushed and copies the pending span `[flushed, pos)` into the output only
//! when it has to inject something, and once more at end of input. Between
//! injections no bytes are touched.
//!
//! There are two injection forms:
//!
//! - tag without a `class` attribute: ` class="ns"` before the closing `>`
//!   or `/` (or `class="ns" ` when the tag ends in ` />`)
//! - tag with a `class` attribute: ` ns` before the closing quote of its
//!   value, whether or not the tag is ignore-listed
//!
//! The rewriter detects but does not repair malformed input. Validity is
//! checked once, at end of input: the machine must be back in its initial
//! state, with every tag closed and no attribute left open.
//!
//! # Examples
//!
//! ```
//! use html_namespacing::add_namespace_to_html;
//!
//! let html = b"<div><span>Hello</span></div><p class=\"below\">Goodbye</p>";
//! let namespaced = add_namespace_to_html(html, "foo").expect("well-formed input");
//! assert_eq!(
//!     namespaced.as_bytes(),
//!     &b"<div class=\"foo\"><span>Hello</span></div><p class=\"below foo\">Goodbye</p>"[..]
//! );
//! ```

use std::borrow::Cow;
use std::ops::Range;

use log::{debug, trace};

use crate::alloc::{AllocationStrategy, SystemHeap};
use crate::buffer::{NamespacedHtml, OutputBuffer};
use crate::error::NamespacingError;
use crate::ignore::should_ignore_tag;
use crate::scan::{find_byte, find_either, find_tag_name_end, is_whitespace, next_char_boundary};

/// Lexical states of the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    OpenTagName,
    OpenTag,
    AttrName,
    AttrEquals,
    AttrValue,
    CloseTag,
    EmptyTag,
    Comment,
    XmlDecl,
    Doctype,
    CData,
}

impl State {
    fn describe(self) -> &'static str {
        match self {
            State::Normal => "text",
            State::OpenTagName => "a tag name",
            State::OpenTag => "an open tag",
            State::AttrName => "an attribute name",
            State::AttrEquals => "an attribute (no quoted value)",
            State::AttrValue => "an attribute value",
            State::CloseTag => "a close tag",
            State::EmptyTag => "a self-closing tag",
            State::Comment => "a comment",
            State::XmlDecl => "an XML declaration",
            State::Doctype => "a DOCTYPE declaration",
            State::CData => "a CDATA section",
        }
    }
}

/// What we know about the open tag being scanned; reset on every `<`
#[derive(Debug, Default)]
struct OpenTagContext {
    name: Range<usize>,
    had_class: bool,
    attr_is_class: bool,
    quote: Option<u8>,
}

/// An attribute counts as `class` only when its whole name is `class`
fn is_class_attribute(rest: &[u8]) -> bool {
    rest.starts_with(b"class")
        && rest
            .get(5)
            .is_none_or(|&b| b == b'=' || is_whitespace(b))
}

struct Rewriter<'a, A: AllocationStrategy> {
    html: &'a [u8],
    ns: &'a [u8],
    pos: usize,
    flushed: usize,
    depth: isize,
    underflowed: bool,
    tag: OpenTagContext,
    out: OutputBuffer<A>,
}

impl<'a, A: AllocationStrategy> Rewriter<'a, A> {
    fn new(html: &'a [u8], ns: &'a [u8], strategy: A) -> Result<Self, NamespacingError> {
        Ok(Self {
            html,
            ns,
            pos: 0,
            flushed: 0,
            depth: 0,
            underflowed: false,
            tag: OpenTagContext::default(),
            out: OutputBuffer::with_capacity(html.len(), strategy)?,
        })
    }

    fn run(mut self) -> Result<NamespacedHtml<A>, NamespacingError> {
        let mut state = State::Normal;
        while self.pos < self.html.len() {
            state = self.step(state)?;
        }
        self.flush()?;
        self.check_complete(state)?;
        self.out.finalize()
    }

    fn step(&mut self, state: State) -> Result<State, NamespacingError> {
        match state {
            State::Normal => Ok(self.normal()),
            State::OpenTagName => Ok(self.open_tag_name()),
            State::OpenTag => self.open_tag(),
            State::AttrName => Ok(self.attr_name()),
            State::AttrEquals => Ok(self.attr_equals()),
            State::AttrValue => self.attr_value(),
            State::CloseTag => Ok(self.close_tag()),
            State::EmptyTag | State::XmlDecl | State::Doctype => Ok(self.until_tag_end(state)),
            State::Comment => Ok(self.until_terminator(b'-', b"-->", State::Comment)),
            State::CData => Ok(self.until_terminator(b']', b"]]>", State::CData)),
        }
    }

    fn normal(&mut self) -> State {
        if self.html[self.pos] != b'<' {
            self.pos = find_byte(self.html, self.pos, b'<');
            return State::Normal;
        }

        self.pos += 1;
        let rest = &self.html[self.pos..];
        if rest.starts_with(b"![CDATA[") {
            State::CData
        } else if rest.starts_with(b"/") {
            State::CloseTag
        } else if rest.starts_with(b"!--") {
            State::Comment
        } else if rest.starts_with(b"!DOCTYPE") {
            State::Doctype
        } else if rest.starts_with(b"?xml") {
            State::XmlDecl
        } else {
            self.tag = OpenTagContext {
                name: self.pos..self.pos,
                ..OpenTagContext::default()
            };
            State::OpenTagName
        }
    }

    fn open_tag_name(&mut self) -> State {
        self.pos = find_tag_name_end(self.html, self.pos);
        self.tag.name.end = self.pos;
        State::OpenTag
    }

    fn open_tag(&mut self) -> Result<State, NamespacingError> {
        let byte = self.html[self.pos];
        match byte {
            b'/' | b'>' => {
                if self.adds_class_attribute() && !self.tag.had_class {
                    let before_trailing_space = byte == b'/' && is_whitespace(self.html[self.pos - 1]);
                    self.inject_class_attribute(before_trailing_space)?;
                }
                self.tag.had_class = false;
                self.tag.quote = None;
                self.pos += 1;

                if byte == b'/' {
                    Ok(State::EmptyTag)
                } else {
                    self.depth += 1;
                    Ok(State::Normal)
                }
            }
            b if is_whitespace(b) => {
                self.pos += 1;
                Ok(State::OpenTag)
            }
            _ => {
                let is_class = is_class_attribute(&self.html[self.pos..]);
                self.tag.attr_is_class = is_class && !self.tag.had_class;
                self.tag.had_class |= is_class;
                Ok(State::AttrName)
            }
        }
    }

    fn attr_name(&mut self) -> State {
        self.pos = find_byte(self.html, self.pos, b'=');
        if self.pos == self.html.len() {
            return State::AttrName;
        }
        self.pos += 1;
        State::AttrEquals
    }

    fn attr_equals(&mut self) -> State {
        self.pos = find_either(self.html, self.pos, b'\'', b'"');
        if self.pos == self.html.len() {
            return State::AttrEquals;
        }
        self.tag.quote = Some(self.html[self.pos]);
        self.pos += 1;
        State::AttrValue
    }

    fn attr_value(&mut self) -> Result<State, NamespacingError> {
        let Some(quote) = self.tag.quote else {
            self.pos = self.html.len();
            return Ok(State::AttrValue);
        };

        // The other quote character is ordinary content here.
        self.pos = find_byte(self.html, self.pos, quote);
        if self.pos == self.html.len() {
            return Ok(State::AttrValue);
        }

        // Existing class values are extended even on ignore-listed tags.
        if self.tag.attr_is_class && self.depth == 0 {
            self.inject_class_value()?;
        }
        self.tag.attr_is_class = false;
        self.pos += 1;
        Ok(State::OpenTag)
    }

    fn close_tag(&mut self) -> State {
        self.pos = find_byte(self.html, self.pos, b'>');
        if self.pos == self.html.len() {
            return State::CloseTag;
        }
        self.depth -= 1;
        if self.depth < 0 {
            self.underflowed = true;
        }
        self.tag.quote = None;
        self.pos += 1;
        State::Normal
    }

    fn until_tag_end(&mut self, state: State) -> State {
        self.pos = find_byte(self.html, self.pos, b'>');
        if self.pos == self.html.len() {
            return state;
        }
        self.pos += 1;
        State::Normal
    }

    /// Comment and CDATA bodies: consume at least one character, then jump
    /// to the next candidate byte and test for the full terminator
    fn until_terminator(&mut self, candidate: u8, terminator: &[u8], state: State) -> State {
        self.pos = next_char_boundary(self.html, self.pos);
        self.pos = find_byte(self.html, self.pos, candidate);
        if self.html[self.pos..].starts_with(terminator) {
            self.pos += terminator.len();
            State::Normal
        } else {
            state
        }
    }

    fn adds_class_attribute(&self) -> bool {
        self.depth == 0 && !should_ignore_tag(&self.html[self.tag.name.clone()])
    }

    fn flush(&mut self) -> Result<(), NamespacingError> {
        self.out.append_bytes(&self.html[self.flushed..self.pos])?;
        self.flushed = self.pos;
        Ok(())
    }

    fn inject_class_attribute(&mut self, before_trailing_space: bool) -> Result<(), NamespacingError> {
        trace!("adding class attribute at byte {}", self.pos);
        self.flush()?;
        if before_trailing_space {
            self.out.append_literal("class=\"")?;
            self.out.append_bytes(self.ns)?;
            self.out.append_literal("\" ")
        } else {
            self.out.append_literal(" class=\"")?;
            self.out.append_bytes(self.ns)?;
            self.out.append_literal("\"")
        }
    }

    fn inject_class_value(&mut self) -> Result<(), NamespacingError> {
        trace!("extending class attribute at byte {}", self.pos);
        self.flush()?;
        self.out.append_literal(" ")?;
        self.out.append_bytes(self.ns)
    }

    fn check_complete(&self, state: State) -> Result<(), NamespacingError> {
        let reason = if state != State::Normal {
            format!("input ended inside {}", state.describe())
        } else if self.underflowed {
            "close tag without a matching open tag".to_string()
        } else if self.depth != 0 {
            format!("{} tag(s) left open at end of input", self.depth)
        } else if self.tag.attr_is_class || self.tag.quote.is_some() {
            "attribute left open at end of input".to_string()
        } else if self.pos != self.html.len() {
            format!("stopped at byte {} of {}", self.pos, self.html.len())
        } else if self.out.len() < self.html.len() {
            format!(
                "output ({} bytes) shorter than input ({} bytes)",
                self.out.len(),
                self.html.len()
            )
        } else {
            return Ok(());
        };

        debug!("rejecting HTML: {}", reason);
        Err(NamespacingError::BadlyFormedHtml(reason))
    }
}

/// Core rewrite over raw namespace bytes; the C boundary enters here
pub(crate) fn rewrite<A: AllocationStrategy>(
    html: &[u8],
    ns: &[u8],
    strategy: A,
) -> Result<NamespacedHtml<A>, NamespacingError> {
    Rewriter::new(html, ns, strategy)?.run()
}

/// Add `ns` as a class to every top-level element of `html`
///
/// Uses the process heap for the output buffer. `ns` should match
/// `[a-zA-Z][-_a-zA-Z0-9]*`; it is copied verbatim and not validated.
///
/// # Errors
///
/// - `NamespacingError::BadlyFormedHtml` if the input is unbalanced or ends
///   inside a tag, attribute, comment, CDATA section or declaration
/// - `NamespacingError::OutOfMemory` if the output buffer cannot grow
pub fn add_namespace_to_html(html: &[u8], ns: &str) -> Result<NamespacedHtml, NamespacingError> {
    rewrite(html, ns.as_bytes(), SystemHeap)
}

/// Same as [`add_namespace_to_html`], allocating through `strategy`
///
/// # Examples
///
/// ```
/// use html_namespacing::add_namespace_to_html_with_strategy;
/// use html_namespacing::alloc::SystemHeap;
///
/// let out = add_namespace_to_html_with_strategy(b"<br/>", "foo", SystemHeap).unwrap();
/// assert_eq!(out.as_bytes(), &b"<br class=\"foo\"/>"[..]);
/// ```
pub fn add_namespace_to_html_with_strategy<A: AllocationStrategy>(
    html: &[u8],
    ns: &str,
    strategy: A,
) -> Result<NamespacedHtml<A>, NamespacingError> {
    rewrite(html, ns.as_bytes(), strategy)
}

/// Boundary helper for hosts with nullable values
///
/// - no HTML gives no result
/// - no namespace gives the input back untouched, without copying
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use html_namespacing::add_namespace_to_optional_html;
///
/// assert_eq!(add_namespace_to_optional_html(None, Some("X")), Ok(None));
///
/// let html: &[u8] = b"<div>hello</div>";
/// let out = add_namespace_to_optional_html(Some(html), None).unwrap();
/// assert!(matches!(out, Some(Cow::Borrowed(_))));
/// ```
pub fn add_namespace_to_optional_html<'a>(
    html: Option<&'a [u8]>,
    ns: Option<&str>,
) -> Result<Option<Cow<'a, [u8]>>, NamespacingError> {
    let Some(html) = html else {
        return Ok(None);
    };
    let Some(ns) = ns else {
        return Ok(Some(Cow::Borrowed(html)));
    };

    let namespaced = add_namespace_to_html(html, ns)?;
    Ok(Some(Cow::Owned(namespaced.into_vec())))
}
