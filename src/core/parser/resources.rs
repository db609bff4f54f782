// src/core/parser/resources.rs

use tracing::debug;

use super::document::{Document, ElementNode};

/// Embedded resources referenced by the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub forms: Vec<String>,
}

/// Collects script sources, stylesheet hrefs and form actions in document order.
/// Elements lacking the relevant attribute are skipped.
pub fn collect_resources(doc: &Document) -> Resources {
    let resources = Resources {
        scripts: attribute_values(doc, "script", "src", |_| true),
        stylesheets: attribute_values(doc, "link", "href", |link| {
            link.attribute("rel") == Some("stylesheet")
        }),
        forms: attribute_values(doc, "form", "action", |_| true),
    };

    debug!(
        scripts = resources.scripts.len(),
        stylesheets = resources.stylesheets.len(),
        forms = resources.forms.len(),
        "Resources collected."
    );
    resources
}

fn attribute_values(
    doc: &Document,
    tag: &str,
    attribute: &str,
    keep: impl Fn(&ElementNode<'_>) -> bool,
) -> Vec<String> {
    doc.elements_named(tag)
        .filter(|element| keep(element))
        .filter_map(|element| element.attribute(attribute))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_each_resource_kind() {
        let doc = Document::load(
            r#"<html><head>
                <link rel="stylesheet" href="/main.css">
                <link rel="icon" href="/favicon.ico">
                <link rel="stylesheet">
                <script src="/app.js"></script>
                <script>inline()</script>
            </head><body>
                <form action="/login"></form>
                <form></form>
                <form action=""></form>
                <script src="https://cdn.example.com/x.js"></script>
            </body></html>"#,
        );
        let resources = collect_resources(&doc);

        assert_eq!(resources.scripts, vec!["/app.js", "https://cdn.example.com/x.js"]);
        assert_eq!(resources.stylesheets, vec!["/main.css"]);
        assert_eq!(resources.forms, vec!["/login", ""]);
    }

    #[test]
    fn test_rel_must_equal_stylesheet_exactly() {
        let doc = Document::load(
            r#"<link rel="alternate stylesheet" href="/alt.css"><link rel="Stylesheet" href="/caps.css">"#,
        );
        assert!(collect_resources(&doc).stylesheets.is_empty());
    }
}
