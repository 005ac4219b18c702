//! Basic namespacing examples

use html_namespacing::template::{TemplateNamespacer, TemplateOptions};
use html_namespacing::{NamespacingError, add_namespace_to_html};

fn main() {
    println!("=== HTML Namespacing - Basic Examples ===\n");

    // Example 1: Top-level elements only
    show("Top-level elements only", "<div><span>Hello</span></div><p>Bye</p>", "foo");

    // Example 2: Existing class attributes are extended
    show("Existing class attribute", "<p class=\"below\">Goodbye</p>", "foo");

    // Example 3: Self-closing tags
    show("Self-closing tags", "<br/><img src=\"a.png\" />", "foo");

    // Example 4: Comments, CDATA and declarations are copied verbatim
    show(
        "Passthrough constructs",
        "<!DOCTYPE html><!-- <div> --><![CDATA[<b>]]><div>x</div>",
        "foo",
    );

    // Example 5: Structural tags are never namespaced
    show("Ignored tags", "<html><body>x</body></html>", "foo");

    // Example 6: Badly formed input is rejected
    show("Badly formed", "<div><span></div>", "foo");

    // Example 7: Namespace derived from a template path
    template_example();
}

fn show(title: &str, html: &str, ns: &str) {
    println!("{title}");
    println!("Input:  {html}");
    match add_namespace_to_html(html.as_bytes(), ns) {
        Ok(out) => println!("Output: {}", String::from_utf8_lossy(&out)),
        Err(e @ NamespacingError::BadlyFormedHtml(_)) => println!("Error:  {e}"),
        Err(e) => println!("Failed: {e}"),
    }
    println!("---\n");
}

fn template_example() {
    println!("Template path namespace");
    let mut namespacer = TemplateNamespacer::new(TemplateOptions::default());
    let key = "users/show.html.erb";
    let html = b"<div class=\"card\">Ada</div>";

    match namespacer.render(key, "html", html) {
        Ok(out) => println!("{key}: {}", String::from_utf8_lossy(&out)),
        Err(e) => println!("{key}: {e}"),
    }
    println!("---\n");
}
