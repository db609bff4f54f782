// src/core/mod.rs

// The `core` module groups everything that does not depend on the terminal UI:
// data models, the HTML analysis engine, the network scanners and the findings
// catalogue.

/// Contains all data structures used throughout the application,
/// such as `ScanReport`, `Severity`, and the per-scanner result structs.
pub mod models;

/// Pure HTML content analysis: turns a raw document into a `ParsedContent` record.
pub mod parser;

/// Network-facing scanners (website content, DNS, TLS, certificate
/// transparency, web archive) and the orchestrator that runs them together.
pub mod scanner;

/// Human-readable details and remediation advice for every finding code.
pub mod knowledge_base;

/// Normalization of user-supplied targets into bare hostnames.
pub mod target;
