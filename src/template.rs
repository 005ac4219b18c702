//! Template-level namespacing
//!
//! Web frameworks render many small templates and want each one's markup
//! scoped to a class derived from the template's path, so that
//! `users/show.html.erb` only styles elements under `.users-show`. This
//! module provides that glue on top of the rewriter:
//!
//! - [`default_relative_path_to_namespace`]: `foo/bar.html.erb` → `foo-bar`
//! - [`is_valid_namespace`]: checks the `[a-zA-Z][-_a-zA-Z0-9]*` token shape
//! - [`TemplateNamespacer`]: applies namespacing per rendered template,
//!   filtered by format, with a configurable error policy
//!
//! # Examples
//!
//! ```
//! use html_namespacing::template::{TemplateNamespacer, TemplateOptions};
//!
//! let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());
//! let html = namespacer
//!     .render("users/show.html.erb", "html", b"<div>Hi</div>")
//!     .expect("well-formed template");
//! assert_eq!(html.as_ref(), &b"<div class=\"users-show\">Hi</div>"[..]);
//! ```

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::error::NamespacingError;
use crate::namespacer::add_namespace_to_html;

/// Format namespaced when no other formats are configured
pub const DEFAULT_TEMPLATE_FORMAT: &str = "html";

fn leading_segment_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^([^.]+)").ok()).as_ref()
}

fn namespace_token_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z][-_a-zA-Z0-9]*$").ok())
        .as_ref()
}

/// Derive a namespace from a template path relative to the view root
///
/// Everything up to the first `.` is kept and `/` separators become `-`.
/// Returns `None` when the path is empty or starts with `.`.
///
/// # Examples
///
/// ```
/// use html_namespacing::template::default_relative_path_to_namespace;
///
/// assert_eq!(default_relative_path_to_namespace("foo/bar.html.erb").as_deref(), Some("foo-bar"));
/// assert_eq!(default_relative_path_to_namespace("layouts/_nav").as_deref(), Some("layouts-_nav"));
/// assert_eq!(default_relative_path_to_namespace(".hidden"), None);
/// ```
pub fn default_relative_path_to_namespace(path: &str) -> Option<String> {
    leading_segment_regex()?
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|segment| segment.as_str().replace('/', "-"))
}

/// Check that `ns` is a namespace token the rewriter can inject verbatim
///
/// # Examples
///
/// ```
/// use html_namespacing::template::is_valid_namespace;
///
/// assert!(is_valid_namespace("users-show"));
/// assert!(!is_valid_namespace("1st"));
/// assert!(!is_valid_namespace("a b"));
/// ```
pub fn is_valid_namespace(ns: &str) -> bool {
    namespace_token_regex().is_some_and(|regex| regex.is_match(ns))
}

/// What to do when a template's HTML cannot be namespaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the error to the caller
    #[default]
    Propagate,
    /// Log a warning and render the template unchanged
    ReturnOriginal,
}

/// Callback mapping a template key to its namespace
pub type PathToNamespace = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Template namespacing configuration
pub struct TemplateOptions {
    /// Custom key → namespace mapping; `None` uses
    /// [`default_relative_path_to_namespace`]
    pub path_to_namespace: Option<PathToNamespace>,
    /// Formats whose output is namespaced
    pub template_formats: HashSet<String>,
    pub error_policy: ErrorPolicy,
    /// Record every rendered template key (for asset lookup)
    pub track_rendered_paths: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            path_to_namespace: None,
            template_formats: HashSet::from([DEFAULT_TEMPLATE_FORMAT.to_string()]),
            error_policy: ErrorPolicy::Propagate,
            track_rendered_paths: false,
        }
    }
}

impl fmt::Debug for TemplateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateOptions")
            .field("path_to_namespace", &self.path_to_namespace.is_some())
            .field("template_formats", &self.template_formats)
            .field("error_policy", &self.error_policy)
            .field("track_rendered_paths", &self.track_rendered_paths)
            .finish()
    }
}

/// Applies namespacing to rendered templates
///
/// One instance per render pass (e.g. per request); it accumulates the
/// keys of rendered templates when tracking is enabled.
#[derive(Debug)]
pub struct TemplateNamespacer {
    options: TemplateOptions,
    rendered_paths: Vec<String>,
}

impl TemplateNamespacer {
    pub fn new(options: TemplateOptions) -> Self {
        Self {
            options,
            rendered_paths: Vec::new(),
        }
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Namespace used for a template key
    pub fn namespace_for(&self, key: &str) -> Option<String> {
        match &self.options.path_to_namespace {
            Some(callback) => callback(key),
            None => default_relative_path_to_namespace(key),
        }
    }

    /// Post-process the HTML rendered for template `key` in `format`
    ///
    /// Returns the HTML unchanged when the format is not namespaced or the
    /// key yields no namespace.
    ///
    /// # Errors
    ///
    /// With [`ErrorPolicy::Propagate`], any rewriter error. With
    /// [`ErrorPolicy::ReturnOriginal`], never.
    pub fn render<'a>(
        &mut self,
        key: &str,
        format: &str,
        html: &'a [u8],
    ) -> Result<Cow<'a, [u8]>, NamespacingError> {
        if self.options.track_rendered_paths {
            self.rendered_paths.push(key.to_string());
        }

        if !self.options.template_formats.contains(format) {
            return Ok(Cow::Borrowed(html));
        }

        let Some(ns) = self.namespace_for(key) else {
            return Ok(Cow::Borrowed(html));
        };

        match add_namespace_to_html(html, &ns) {
            Ok(namespaced) => Ok(Cow::Owned(namespaced.into_vec())),
            Err(e) => match self.options.error_policy {
                ErrorPolicy::Propagate => Err(e),
                ErrorPolicy::ReturnOriginal => {
                    warn!("rendering template '{}' without namespace: {}", key, e);
                    Ok(Cow::Borrowed(html))
                }
            },
        }
    }

    /// Keys of templates rendered so far, in render order
    pub fn rendered_paths(&self) -> &[String] {
        &self.rendered_paths
    }

    pub fn take_rendered_paths(&mut self) -> Vec<String> {
        std::mem::take(&mut self.rendered_paths)
    }
}
