// src/core/parser/mod.rs

//! HTML content analysis.
//!
//! `analyze` parses a raw HTML document once and runs every extractor over the same
//! read-only tree: link classification, social-media detection, technology
//! fingerprinting, resource and comment collection, and metadata extraction. The
//! result is a `ParsedContent` record. Nothing in this module performs I/O.

pub mod comments;
pub mod document;
pub mod links;
pub mod metadata;
pub mod resources;
pub mod technologies;


use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use self::document::Document;

/// The only failure the analyzer can report: no tree could be built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to parse HTML content: {reason}")]
pub struct ParseError {
    pub reason: String,
}

/// Tunables for a single analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Record comments whose text is empty after trimming.
    pub keep_empty_comments: bool,
    /// Refuse documents larger than this many bytes.
    pub max_document_bytes: Option<usize>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            keep_empty_comments: true,
            max_document_bytes: None,
        }
    }
}

/// Intelligence gathered from one HTML document.
///
/// Built once by `analyze` and never modified afterwards. Every entry of `links`
/// sits in exactly one of `emails`, `phone_numbers`, `internal_links` or
/// `external_links`, and every social-media link is also an external link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedContent {
    title: String,
    meta_tags: BTreeMap<String, String>,
    links: Vec<String>,
    emails: Vec<String>,
    phone_numbers: Vec<String>,
    internal_links: Vec<String>,
    external_links: Vec<String>,
    social_media: BTreeMap<String, Vec<String>>,
    technologies: Vec<String>,
    scripts: Vec<String>,
    stylesheets: Vec<String>,
    forms: Vec<String>,
    comments: Vec<String>,
}

impl ParsedContent {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn meta_tags(&self) -> &BTreeMap<String, String> {
        &self.meta_tags
    }

    /// Every anchor href, unmodified, in document order.
    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn phone_numbers(&self) -> &[String] {
        &self.phone_numbers
    }

    pub fn internal_links(&self) -> &[String] {
        &self.internal_links
    }

    pub fn external_links(&self) -> &[String] {
        &self.external_links
    }

    /// Platform name → external links pointing at it.
    pub fn social_media(&self) -> &BTreeMap<String, Vec<String>> {
        &self.social_media
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    pub fn forms(&self) -> &[String] {
        &self.forms
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

/// Analyzes `html` with default options.
pub fn analyze(html: &str) -> Result<ParsedContent, ParseError> {
    analyze_with(html, &AnalyzerOptions::default())
}

/// Parses `html` once and assembles the full record.
pub fn analyze_with(html: &str, options: &AnalyzerOptions) -> Result<ParsedContent, ParseError> {
    if let Some(limit) = options.max_document_bytes {
        if html.len() > limit {
            return Err(ParseError {
                reason: format!("document is {} bytes, above the {limit} byte limit", html.len()),
            });
        }
    }

    let doc = Document::load(html);

    let taxonomy = links::classify_links(&doc);
    let social_media = links::detect_social_media(&taxonomy.external);
    let resources = resources::collect_resources(&doc);

    let parsed = ParsedContent {
        title: metadata::extract_title(&doc),
        meta_tags: metadata::extract_meta_tags(&doc),
        links: taxonomy.links,
        emails: taxonomy.emails,
        phone_numbers: taxonomy.phone_numbers,
        internal_links: taxonomy.internal,
        external_links: taxonomy.external,
        social_media,
        technologies: technologies::fingerprint(&doc),
        scripts: resources.scripts,
        stylesheets: resources.stylesheets,
        forms: resources.forms,
        comments: comments::collect_comments(&doc, options.keep_empty_comments),
    };

    info!(
        links = parsed.links.len(),
        emails = parsed.emails.len(),
        technologies = parsed.technologies.len(),
        "Successfully parsed HTML content."
    );
    Ok(parsed)
}
