// src/core/parser/metadata.rs

use std::collections::BTreeMap;

use tracing::debug;

use super::document::Document;

/// Text of the first `<title>` element, or an empty string.
pub fn extract_title(doc: &Document) -> String {
    doc.elements_named("title")
        .next()
        .map(|title| title.text())
        .unwrap_or_default()
}

/// `name` → `content` for every `<meta>` carrying both attributes.
///
/// A name seen again later in the document replaces the earlier content.
pub fn extract_meta_tags(doc: &Document) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for meta in doc.elements_named("meta") {
        if let (Some(name), Some(content)) = (meta.attribute("name"), meta.attribute("content")) {
            if let Some(previous) = tags.insert(name.to_string(), content.to_string()) {
                debug!(name, previous = %previous, "Duplicate meta name, keeping the later value.");
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_title_wins() {
        let doc = Document::load("<html><head><title>Acme &amp; Co</title></head><body><svg><title>icon</title></svg></body></html>");
        assert_eq!(extract_title(&doc), "Acme & Co");
    }

    #[test]
    fn test_missing_title_is_empty() {
        assert_eq!(extract_title(&Document::load("<p>no title</p>")), "");
    }

    #[test]
    fn test_meta_requires_name_and_content() {
        let doc = Document::load(
            r#"<meta charset="utf-8"><meta name="description" content="Widgets"><meta property="og:title" content="x"><meta name="robots">"#,
        );
        let tags = extract_meta_tags(&doc);

        assert_eq!(tags.len(), 1);
        assert_eq!(tags["description"], "Widgets");
    }

    #[test]
    fn test_later_meta_overwrites_earlier() {
        let doc = Document::load(r#"<meta name="x" content="1"><meta name="y" content="a"><meta name="x" content="2">"#);
        let tags = extract_meta_tags(&doc);

        assert_eq!(tags["x"], "2");
        assert_eq!(tags["y"], "a");
    }
}
