// src/core/scanner/content_scanner.rs

use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::config::ReconConfig;
use crate::core::models::{AnalysisFinding, ContentResults, Severity};
use crate::core::parser::{self, AnalyzerOptions, ParsedContent};
use super::http_client;

/// Fetches the landing page of the target and runs the HTML analyzer on it.
///
/// A fetch failure is stored in `page` as an error. A document the analyzer
/// refuses is logged and replaced by an empty record so the rest of the report
/// still renders.
///
/// # Arguments
/// * `target` - The hostname to scan.
/// * `config` - HTTP settings and analyzer options.
pub async fn run_content_scan(target: &str, config: &ReconConfig) -> ContentResults {
    info!(target, "Starting content scan.");
    let url = format!("https://{}", target);

    let page = match http_client(config) {
        Ok(client) => match fetch_page(&client, &url).await {
            Ok(body) => Ok(Some(parse_or_default(&body, &config.analyzer))),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let mut results = ContentResults {
        url,
        page,
        analysis: Vec::new(),
    };
    results.analysis = analyze_content_results(&results);
    info!(findings = %results.analysis.len(), "Content scan finished.");
    results
}

/// GETs `url` and returns the body. Anything but `200 OK` is an error.
async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, String> {
    let response = client.get(url).send().await.map_err(|e| {
        error!(url = %url, error = %e, "HTTP request failed");
        format!("failed to fetch content from {}: {}", url, e)
    })?;

    let status = response.status();
    info!(status = %status, "Received HTTP response.");
    if status != StatusCode::OK {
        warn!(url = %url, status = %status, "Unexpected status code.");
        return Err(format!("failed to fetch content from {}, status code: {}", url, status.as_u16()));
    }

    let body = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read response body");
        format!("failed to read response body from {}: {}", url, e)
    })?;
    debug!(bytes = %body.len(), "Successfully read response body.");
    Ok(body)
}

fn parse_or_default(body: &str, options: &AnalyzerOptions) -> ParsedContent {
    parser::analyze_with(body, options).unwrap_or_else(|e| {
        warn!(error = %e, "HTML analysis failed, continuing with an empty record.");
        ParsedContent::default()
    })
}

/// Turns the analyzed page into findings.
fn analyze_content_results(results: &ContentResults) -> Vec<AnalysisFinding> {
    debug!("Analyzing website content.");
    let mut analyses = Vec::new();

    let content = match &results.page {
        Ok(Some(content)) => content,
        Ok(None) => return analyses,
        Err(_) => {
            debug!("Fetch failed, adding CONTENT_FETCH_FAILED finding.");
            analyses.push(AnalysisFinding::new(Severity::Warning, "CONTENT_FETCH_FAILED"));
            return analyses;
        }
    };

    if content.forms().iter().any(|action| is_plain_http(action)) {
        analyses.push(AnalysisFinding::new(Severity::Warning, "CONTENT_INSECURE_FORM_ACTION"));
    }
    if content.scripts().iter().any(|src| is_plain_http(src)) {
        analyses.push(AnalysisFinding::new(Severity::Warning, "CONTENT_INSECURE_SCRIPT"));
    }
    if !content.emails().is_empty() {
        analyses.push(AnalysisFinding::new(Severity::Info, "CONTENT_EMAILS_EXPOSED"));
    }
    if !content.phone_numbers().is_empty() {
        analyses.push(AnalysisFinding::new(Severity::Info, "CONTENT_PHONES_EXPOSED"));
    }
    if !content.comments().is_empty() {
        analyses.push(AnalysisFinding::new(Severity::Info, "CONTENT_COMMENTS_PRESENT"));
    }

    analyses
}

fn is_plain_http(reference: &str) -> bool {
    reference
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results_for(html: &str) -> ContentResults {
        ContentResults {
            url: "https://example.com".to_string(),
            page: Ok(Some(parser::analyze(html).unwrap())),
            analysis: Vec::new(),
        }
    }

    fn codes(findings: &[AnalysisFinding]) -> Vec<&str> {
        findings.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn test_fetch_failure_is_reported() {
        let results = ContentResults {
            page: Err("connection refused".to_string()),
            ..ContentResults::default()
        };
        assert_eq!(codes(&analyze_content_results(&results)), vec!["CONTENT_FETCH_FAILED"]);
    }

    #[test]
    fn test_clean_page_has_no_findings() {
        let results = results_for(r#"<form action="/search"></form><script src="https://cdn.example.com/a.js"></script>"#);
        assert!(analyze_content_results(&results).is_empty());
    }

    #[test]
    fn test_exposure_findings() {
        let results = results_for(
            r#"<!-- v2 --><form action="HTTP://example.com/post"></form>
               <script src="http://cdn.example.com/a.js"></script>
               <a href="mailto:ceo@example.com">m</a><a href="tel:123">t</a>"#,
        );
        assert_eq!(
            codes(&analyze_content_results(&results)),
            vec![
                "CONTENT_INSECURE_FORM_ACTION",
                "CONTENT_INSECURE_SCRIPT",
                "CONTENT_EMAILS_EXPOSED",
                "CONTENT_PHONES_EXPOSED",
                "CONTENT_COMMENTS_PRESENT",
            ]
        );
    }

    #[test]
    fn test_rejected_document_becomes_empty_record() {
        let options = AnalyzerOptions {
            max_document_bytes: Some(4),
            ..AnalyzerOptions::default()
        };
        assert_eq!(parse_or_default("<p>too long</p>", &options), ParsedContent::default());
    }
}
