// src/core/parser/technologies.rs

use tracing::debug;

use super::document::Document;

/// Technology names and the substring that betrays them, ordered by name.
///
/// A signature matches when it is contained (case-sensitive) in any element's
/// `class` or `id`, or in any `<script src>`.
pub const TECHNOLOGY_SIGNATURES: &[(&str, &str)] = &[
    ("Angular", "ng-"),
    ("Bootstrap", "bootstrap"),
    ("React", "react"),
    ("Vue.js", "vue"),
    ("WordPress", "wp-content"),
    ("jQuery", "jquery"),
];

/// Returns each detected technology once, in table order.
pub fn fingerprint(doc: &Document) -> Vec<String> {
    let haystacks = collect_haystacks(doc);

    let technologies: Vec<String> = TECHNOLOGY_SIGNATURES
        .iter()
        .filter(|(_, signature)| haystacks.iter().any(|value| value.contains(signature)))
        .map(|(name, _)| name.to_string())
        .collect();

    debug!(
        scanned_values = haystacks.len(),
        detected = ?technologies,
        "Technology fingerprinting finished."
    );
    technologies
}

/// All attribute values a signature may appear in.
fn collect_haystacks(doc: &Document) -> Vec<&str> {
    let mut values = Vec::new();
    for element in doc.elements() {
        values.extend(element.attribute("class"));
        values.extend(element.attribute("id"));
        if element.name() == "script" {
            values.extend(element.attribute("src"));
        }
    }
    values
}
