// src/core/scanner/wayback_scanner.rs

use tracing::{debug, error, info, warn};

use crate::config::ReconConfig;
use crate::core::models::{AnalysisFinding, ScanResult, Severity, Snapshot, WaybackResults};
use super::http_client;

const CDX_URL: &str = "https://web.archive.org/cdx/search/cdx";

/// Lists archived snapshots of the target from the Wayback Machine CDX API.
pub async fn run_wayback_scan(target: &str, config: &ReconConfig) -> WaybackResults {
    info!(target, "Starting web archive scan.");

    let snapshots = match http_client(config) {
        Ok(client) => fetch_snapshots(&client, target, config.wayback_limit).await,
        Err(e) => Err(e),
    };

    let mut results = WaybackResults {
        snapshots,
        analysis: Vec::new(),
    };
    results.analysis = analyze_wayback_results(&results);
    info!(findings = %results.analysis.len(), "Web archive scan finished.");
    results
}

async fn fetch_snapshots(client: &reqwest::Client, target: &str, limit: usize) -> ScanResult<Vec<Snapshot>> {
    let limit = limit.to_string();
    debug!(target, limit = %limit, "Querying the CDX API.");
    let response = client
        .get(CDX_URL)
        .query(&[
            ("url", target),
            ("output", "json"),
            ("fl", "timestamp,original,statuscode"),
            ("limit", limit.as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "Wayback request failed");
            format!("Wayback request failed: {}", e)
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, "Wayback Machine returned an error status.");
        return Err(format!("Wayback Machine returned status code {}", status.as_u16()));
    }

    let body = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read Wayback response");
        format!("failed to read Wayback response: {}", e)
    })?;

    parse_snapshots(&body)
}

/// Decodes CDX JSON output: an array of rows whose first row is the header.
fn parse_snapshots(body: &str) -> ScanResult<Vec<Snapshot>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let rows: Vec<Vec<String>> = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Could not decode CDX response");
        format!("invalid CDX response: {}", e)
    })?;

    let snapshots: Vec<Snapshot> = rows
        .into_iter()
        .skip(1)
        .filter_map(|row| match row.as_slice() {
            [timestamp, original, status, ..] => Some(Snapshot {
                archive_url: format!("https://web.archive.org/web/{}/{}", timestamp, original),
                timestamp: timestamp.clone(),
                original: original.clone(),
                status: status.clone(),
            }),
            _ => {
                debug!(?row, "Skipping short CDX row.");
                None
            }
        })
        .collect();

    if snapshots.is_empty() { Ok(None) } else { Ok(Some(snapshots)) }
}

fn analyze_wayback_results(results: &WaybackResults) -> Vec<AnalysisFinding> {
    let mut analyses = Vec::new();
    match &results.snapshots {
        Err(_) => analyses.push(AnalysisFinding::new(Severity::Info, "WAYBACK_LOOKUP_FAILED")),
        Ok(None) => analyses.push(AnalysisFinding::new(Severity::Info, "WAYBACK_NO_SNAPSHOTS")),
        Ok(Some(_)) => {}
    }
    analyses
}
