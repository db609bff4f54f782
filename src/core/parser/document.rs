// src/core/parser/document.rs

//! Typed, read-only view over a parsed HTML tree.
//!
//! Parsing is delegated to `scraper` (html5ever underneath), which is tolerant of
//! malformed markup and always produces a best-effort tree. The extractors never
//! touch `scraper` types directly: they walk `DocNode` values in document order and
//! read attributes through `ElementNode::attribute`.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

/// One node of the tree, tagged by kind.
#[derive(Clone, Copy)]
pub enum DocNode<'a> {
    Element(ElementNode<'a>),
    Text(&'a str),
    Comment(&'a str),
}

/// An element node with its tag name and attributes.
#[derive(Clone, Copy)]
pub struct ElementNode<'a> {
    element: ElementRef<'a>,
}

impl Document {
    /// Builds the tree for `source`. Never fails on malformed markup.
    pub fn load(source: &str) -> Self {
        let html = Html::parse_document(source);
        debug!(
            bytes = source.len(),
            recovered_errors = html.errors.len(),
            "HTML document loaded."
        );
        Self { html }
    }

    /// Every element, text and comment node, depth-first in document order.
    ///
    /// The walk starts at the tree root rather than at `<html>`, so comments placed
    /// before or after the root element are included.
    pub fn nodes(&self) -> impl Iterator<Item = DocNode<'_>> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(|node| match node.value() {
                Node::Element(_) => ElementRef::wrap(node).map(|element| DocNode::Element(ElementNode { element })),
                Node::Text(text) => Some(DocNode::Text(&**text)),
                Node::Comment(comment) => Some(DocNode::Comment(&**comment)),
                _ => None,
            })
    }

    /// Every element node in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementNode<'_>> {
        self.nodes().filter_map(|node| match node {
            DocNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Element nodes whose tag name equals `name`, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementNode<'a>> + 'a {
        self.elements().filter(move |element| element.name() == name)
    }
}

impl<'a> ElementNode<'a> {
    /// Lowercased local tag name (`a`, `script`, `meta`...).
    pub fn name(&self) -> &'a str {
        self.element.value().name()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_are_in_document_order() {
        let doc = Document::load("<!-- head --><html><body><p id=\"a\">one</p><!-- mid --><p id=\"b\">two</p></body></html>");
        let kinds: Vec<String> = doc
            .nodes()
            .map(|node| match node {
                DocNode::Element(el) => format!("<{}>", el.name()),
                DocNode::Text(text) => text.to_string(),
                DocNode::Comment(comment) => format!("#{}", comment.trim()),
            })
            .collect();

        assert_eq!(kinds, vec!["#head", "<html>", "<head>", "<body>", "<p>", "one", "#mid", "<p>", "two"]);
    }

    #[test]
    fn test_attribute_lookup() {
        let doc = Document::load("<a href=\"/x\" CLASS=\"btn\">go</a>");
        let anchor = doc.elements_named("a").next().expect("anchor should be parsed");

        assert_eq!(anchor.attribute("href"), Some("/x"));
        assert_eq!(anchor.attribute("class"), Some("btn"));
        assert_eq!(anchor.attribute("id"), None);
        assert_eq!(anchor.text(), "go");
    }

    #[test]
    fn test_malformed_markup_still_yields_tree() {
        let doc = Document::load("<div><a href='/open'>unclosed <b>tags</div>");
        assert_eq!(doc.elements_named("a").count(), 1);
    }
}
