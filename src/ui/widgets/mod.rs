// src/ui/widgets/mod.rs

// Module declarations for all UI widgets.

pub mod footer;      // Key hints and export status.
pub mod input;       // The target domain input field.
pub mod report_view; // The scrollable full report.
pub mod summary;     // Score, issue counts and technologies.
