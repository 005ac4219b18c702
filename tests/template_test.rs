//! Template namespacing tests

use html_namespacing::NamespacingError;
use html_namespacing::template::{ErrorPolicy, TemplateNamespacer, TemplateOptions};
use std::borrow::Cow;
use std::collections::HashSet;

fn render(namespacer: &mut TemplateNamespacer, key: &str, format: &str, html: &str) -> String {
    let out = namespacer
        .render(key, format, html.as_bytes())
        .unwrap_or_else(|e| panic!("rendering {key} failed: {e}"));
    String::from_utf8(out.into_owned()).expect("UTF-8 output")
}

#[test]
fn test_namespace_derived_from_template_path() {
    let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());

    assert_eq!(
        render(&mut namespacer, "users/show.html.erb", "html", "<div>Hi</div>"),
        "<div class=\"users-show\">Hi</div>"
    );
    assert_eq!(
        render(&mut namespacer, "admin/users/_form.html.erb", "html", "<form></form>"),
        "<form class=\"admin-users-_form\"></form>"
    );
}

#[test]
fn test_other_formats_pass_through() {
    let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());
    let json = "{\"a\": \"<div>\"}";

    let out = namespacer
        .render("users/show.json.erb", "json", json.as_bytes())
        .expect("untouched");
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(out.as_ref(), json.as_bytes());
}

#[test]
fn test_configured_formats() {
    let options = TemplateOptions {
        template_formats: HashSet::from(["html".to_string(), "xml".to_string()]),
        ..TemplateOptions::default()
    };
    let mut namespacer = TemplateNamespacer::new(options);

    assert_eq!(
        render(&mut namespacer, "feed/index.xml.builder", "xml", "<entry/>"),
        "<entry class=\"feed-index\"/>"
    );
}

#[test]
fn test_custom_path_to_namespace() {
    let options = TemplateOptions {
        path_to_namespace: Some(Box::new(|key: &str| {
            key.strip_prefix("widgets/")
                .map(|rest| format!("widget-{}", rest.split('.').next().unwrap_or(rest)))
        })),
        ..TemplateOptions::default()
    };
    let mut namespacer = TemplateNamespacer::new(options);

    assert_eq!(
        render(&mut namespacer, "widgets/clock.html", "html", "<span>12:00</span>"),
        "<span class=\"widget-clock\">12:00</span>"
    );
    // No namespace from the callback: rendered as-is.
    assert_eq!(
        render(&mut namespacer, "pages/home.html", "html", "<p>home</p>"),
        "<p>home</p>"
    );
}

#[test]
fn test_propagate_policy_returns_error() {
    let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());
    let result = namespacer.render("broken/view.html", "html", b"<div>unclosed");

    assert!(matches!(result, Err(NamespacingError::BadlyFormedHtml(_))));
}

#[test]
fn test_return_original_policy_renders_unchanged() {
    let options = TemplateOptions {
        error_policy: ErrorPolicy::ReturnOriginal,
        ..TemplateOptions::default()
    };
    let mut namespacer = TemplateNamespacer::new(options);
    let html = b"<div>unclosed";

    let out = namespacer
        .render("broken/view.html", "html", html)
        .expect("original returned");
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(out.as_ref(), html);
}

#[test]
fn test_rendered_paths_tracking() {
    let options = TemplateOptions {
        track_rendered_paths: true,
        ..TemplateOptions::default()
    };
    let mut namespacer = TemplateNamespacer::new(options);

    render(&mut namespacer, "layouts/application.html", "html", "<body></body>");
    render(&mut namespacer, "users/show.html", "html", "<div></div>");
    render(&mut namespacer, "users/show.json", "json", "{}");

    assert_eq!(
        namespacer.rendered_paths(),
        ["layouts/application.html", "users/show.html", "users/show.json"]
    );

    let taken = namespacer.take_rendered_paths();
    assert_eq!(taken.len(), 3);
    assert!(namespacer.rendered_paths().is_empty());
}

#[test]
fn test_tracking_disabled_by_default() {
    let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());
    render(&mut namespacer, "users/show.html", "html", "<div></div>");

    assert!(namespacer.rendered_paths().is_empty());
}

#[test]
fn test_namespace_for() {
    let namespacer = TemplateNamespacer::new(TemplateOptions::default());

    assert_eq!(namespacer.namespace_for("a/b.html").as_deref(), Some("a-b"));
    assert_eq!(namespacer.namespace_for(".hidden"), None);
    assert!(namespacer.options().template_formats.contains("html"));
}
