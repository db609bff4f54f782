// src/core/parser/comments.rs

use tracing::debug;

use super::document::{DocNode, Document};

/// Trimmed text of every comment node, depth-first in document order.
///
/// Comments that are empty after trimming are kept unless `keep_empty` is false.
pub fn collect_comments(doc: &Document, keep_empty: bool) -> Vec<String> {
    let comments: Vec<String> = doc
        .nodes()
        .filter_map(|node| match node {
            DocNode::Comment(text) => Some(text.trim()),
            _ => None,
        })
        .filter(|text| keep_empty || !text.is_empty())
        .map(str::to_string)
        .collect();

    debug!(count = comments.len(), keep_empty, "Comments collected.");
    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!-- build 42 --><html><head><!--   --></head><body><div><!--\n  nested note\n--></div></body></html>";

    #[test]
    fn test_comments_are_trimmed_and_ordered() {
        let doc = Document::load(PAGE);
        assert_eq!(collect_comments(&doc, true), vec!["build 42", "", "nested note"]);
    }

    #[test]
    fn test_empty_comments_can_be_dropped() {
        let doc = Document::load(PAGE);
        assert_eq!(collect_comments(&doc, false), vec!["build 42", "nested note"]);
    }
}
