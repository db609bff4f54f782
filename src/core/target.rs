// src/core/target.rs

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Dot-separated labels of letters, digits and inner hyphens, at least two labels.
static RE_HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .unwrap()
});

/// Turns whatever the user typed ("Example.com", "https://www.example.com/path")
/// into a lowercase hostname, or `None` if it is not a usable domain.
pub fn normalize_target(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?.trim_end_matches('.').to_ascii_lowercase();

    if RE_HOSTNAME.is_match(&host) { Some(host) } else { None }
}
