// src/core/parser/links.rs

//! Anchor classification and social-media detection.
//!
//! Every `<a href>` lands in exactly one bucket: email, phone, internal or external.
//! Classification is purely syntactic; relative references are never resolved
//! against a base URL.

use std::collections::BTreeMap;

use tracing::debug;

use super::document::Document;

const MAILTO_PREFIX: &str = "mailto:";
const TEL_PREFIX: &str = "tel:";

/// Known platforms and the domain substring that identifies them.
pub const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("Facebook", "facebook.com"),
    ("GitHub", "github.com"),
    ("Instagram", "instagram.com"),
    ("LinkedIn", "linkedin.com"),
    ("Twitter", "twitter.com"),
];

/// Where a single href belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind<'a> {
    Email(&'a str),
    Phone(&'a str),
    Internal,
    External,
}

/// Anchors partitioned by kind, each list in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTaxonomy {
    pub links: Vec<String>,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

/// Walks every anchor with an `href` and sorts it into the taxonomy.
pub fn classify_links(doc: &Document) -> LinkTaxonomy {
    let mut taxonomy = LinkTaxonomy::default();

    for anchor in doc.elements_named("a") {
        let Some(href) = anchor.attribute("href") else {
            continue;
        };
        taxonomy.links.push(href.to_string());

        match classify(href) {
            LinkKind::Email(address) => taxonomy.emails.push(address.to_string()),
            LinkKind::Phone(number) => taxonomy.phone_numbers.push(number.to_string()),
            LinkKind::External => taxonomy.external.push(href.to_string()),
            LinkKind::Internal => taxonomy.internal.push(href.to_string()),
        }
    }

    debug!(
        total = taxonomy.links.len(),
        emails = taxonomy.emails.len(),
        phones = taxonomy.phone_numbers.len(),
        internal = taxonomy.internal.len(),
        external = taxonomy.external.len(),
        "Anchors classified."
    );
    taxonomy
}

/// Classifies one raw href.
pub fn classify(href: &str) -> LinkKind<'_> {
    if let Some(address) = strip_prefix_ignore_case(href, MAILTO_PREFIX) {
        LinkKind::Email(address)
    } else if let Some(number) = strip_prefix_ignore_case(href, TEL_PREFIX) {
        LinkKind::Phone(number)
    } else if has_authority(href) {
        LinkKind::External
    } else {
        LinkKind::Internal
    }
}

/// True when the reference carries a non-empty host component.
///
/// `scheme://host...` and `//host...` qualify. Path-only, fragment-only and empty
/// references do not, and neither do schemes without `//` (`javascript:`, `data:`).
/// The decision is syntactic: `///x` and `http:///x` have an empty authority and
/// stay internal, while `http://example.com:99999` names a host and is external.
pub fn has_authority(href: &str) -> bool {
    authority(href).is_some_and(|authority| !host_of(authority).is_empty())
}

// Text between the leading `//` and the first `/`, `?` or `#`.
fn authority(href: &str) -> Option<&str> {
    let after_slashes = match href.strip_prefix("//") {
        Some(rest) => rest,
        None => {
            let (scheme, rest) = href.split_once(':')?;
            if !is_scheme(scheme) {
                return None;
            }
            rest.strip_prefix("//")?
        }
    };
    let end = after_slashes.find(['/', '?', '#']).unwrap_or(after_slashes.len());
    Some(&after_slashes[..end])
}

// Drops `userinfo@` and `:port`. An unterminated IPv6 literal has no host.
fn host_of(authority: &str) -> &str {
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, rest)| rest);
    if let Some(literal) = host_port.strip_prefix('[') {
        return match literal.find(']') {
            Some(end) => &literal[..end],
            None => "",
        };
    }
    host_port.split_once(':').map_or(host_port, |(host, _)| host)
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// Tags external links with every platform whose domain they contain.
///
/// One link may match several platforms and is listed under each of them.
pub fn detect_social_media(external_links: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut social: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for href in external_links {
        for (platform, domain) in SOCIAL_PLATFORMS {
            if href.contains(domain) {
                social.entry(platform.to_string()).or_default().push(href.clone());
            }
        }
    }

    debug!(platforms = social.len(), "Social media links detected.");
    social
}
