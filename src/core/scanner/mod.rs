// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// It declares and makes all sub-scanner modules public.
pub mod content_scanner;
pub mod ct_scanner;
pub mod dns_scanner;
pub mod geo_scanner;
pub mod ssl_scanner;
pub mod wayback_scanner;
pub mod whois_scanner;

use chrono::Utc;
use tracing::{error, info};

use crate::config::ReconConfig;
use crate::core::models::{DnsResults, GeoResults, ScanReport};
use self::content_scanner::run_content_scan;
use self::ct_scanner::run_ct_scan;
use self::dns_scanner::run_dns_scan;
use self::geo_scanner::run_geo_scan;
use self::ssl_scanner::run_ssl_scan;
use self::wayback_scanner::run_wayback_scan;
use self::whois_scanner::run_whois_scan;

/// Executes all available scans in parallel and aggregates the results into a single report.
///
/// Each scanner handles its own failures and records them in its result struct, so
/// one unreachable service never prevents the others from reporting.
///
/// # Arguments
///
/// * `target` - The hostname to be scanned (e.g., "example.com").
/// * `config` - Timeouts, limits and analyzer options.
pub async fn run_full_scan(target: &str, config: &ReconConfig) -> ScanReport {
    info!(target, "Starting full reconnaissance scan.");

    let (content_results, (dns_results, geo_results), whois_results, ssl_results, ct_results, wayback_results) = tokio::join!(
        run_content_scan(target, config),
        run_dns_then_geo_scan(target, config),
        run_whois_scan(target, config),
        run_ssl_scan(target),
        run_ct_scan(target, config),
        run_wayback_scan(target, config)
    );

    let report = ScanReport {
        target: target.to_string(),
        scanned_at: Utc::now(),
        content_results,
        dns_results,
        geo_results,
        whois_results,
        ssl_results,
        ct_results,
        wayback_results,
    };
    info!(target, findings = report.all_findings().count(), "Full scan finished.");
    report
}

/// Geolocation needs the resolved addresses, so it runs once DNS is done.
async fn run_dns_then_geo_scan(target: &str, config: &ReconConfig) -> (DnsResults, GeoResults) {
    let dns_results = run_dns_scan(target).await;
    let addresses = match &dns_results.addresses {
        Ok(Some(addresses)) => addresses.clone(),
        _ => Vec::new(),
    };
    let geo_results = run_geo_scan(&addresses, config).await;
    (dns_results, geo_results)
}

/// Builds the HTTP client shared by the web-facing scanners.
pub(crate) fn http_client(config: &ReconConfig) -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            format!("HTTP client error: {}", e)
        })
}
