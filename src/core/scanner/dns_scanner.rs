// src/core/scanner/dns_scanner.rs

use std::net::IpAddr;

use tracing::{debug, info, warn};

use crate::core::models::{AnalysisFinding, DnsResults, MxRecord, ReverseRecord, ScanResult, Severity};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;

/// Resolves the target's addresses, their reverse names and the mail exchangers.
///
/// Address and MX lookups run concurrently. Reverse lookups follow, one per
/// resolved address, in address order.
///
/// # Arguments
/// * `target` - The hostname to be resolved.
///
/// # Returns
/// A `DnsResults` struct containing both the raw lookup data and the analysis findings.
pub async fn run_dns_scan(target: &str) -> DnsResults {
    info!(target, "Starting DNS scan.");

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let (addresses, mx) = tokio::join!(lookup_addresses(&resolver, target), lookup_mx(&resolver, target));

    let reverse = match &addresses {
        Ok(Some(ips)) => {
            let mut records = Vec::with_capacity(ips.len());
            for ip in ips {
                records.push(lookup_reverse(&resolver, ip).await);
            }
            records
        }
        _ => Vec::new(),
    };

    debug!("All DNS lookups completed, starting analysis.");

    let mut results = DnsResults {
        addresses,
        reverse,
        mx,
        analysis: Vec::new(),
    };

    results.analysis = analyze_dns_results(&results);
    info!(findings = %results.analysis.len(), "DNS scan finished.");
    results
}

/// Analyzes the collected DNS records and generates findings.
fn analyze_dns_results(results: &DnsResults) -> Vec<AnalysisFinding> {
    let mut analyses = Vec::new();

    match &results.addresses {
        Ok(Some(_)) => {
            let any_ptr = results.reverse.iter().any(|r| matches!(r.names, Ok(Some(_))));
            if !any_ptr {
                debug!("Reverse analysis: no PTR record for any address, adding Info finding.");
                analyses.push(AnalysisFinding::new(Severity::Info, "DNS_NO_REVERSE_RECORDS"));
            }
        }
        // A name that does not resolve cannot be reached at all.
        Ok(None) | Err(_) => {
            debug!("Address analysis: nothing resolved, adding Critical finding.");
            analyses.push(AnalysisFinding::new(Severity::Critical, "DNS_NO_ADDRESS_RECORDS"));
        }
    }

    if let Ok(None) = &results.mx {
        debug!("MX analysis: No records found, adding Info finding.");
        analyses.push(AnalysisFinding::new(Severity::Info, "DNS_MX_MISSING"));
    }

    analyses
}

async fn lookup_addresses(resolver: &TokioAsyncResolver, target: &str) -> ScanResult<Vec<String>> {
    debug!(target, "Looking up A/AAAA records.");
    match resolver.lookup_ip(target).await {
        Ok(lookup) => {
            let ips: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();
            if ips.is_empty() {
                return Ok(None);
            }
            info!(count = %ips.len(), "Resolved addresses.");
            Ok(Some(ips))
        }
        Err(e) => empty_or_error(target, "Address", e),
    }
}

async fn lookup_reverse(resolver: &TokioAsyncResolver, ip: &str) -> ReverseRecord {
    debug!(ip, "Looking up PTR records.");
    let names = match ip.parse::<IpAddr>() {
        Ok(addr) => match resolver.reverse_lookup(addr).await {
            Ok(lookup) => {
                let names: Vec<String> = lookup
                    .iter()
                    .map(|name| name.to_string().trim_end_matches('.').to_string())
                    .collect();
                if names.is_empty() { Ok(None) } else { Ok(Some(names)) }
            }
            Err(e) => empty_or_error(ip, "Reverse", e),
        },
        Err(e) => Err(format!("Invalid address {}: {}", ip, e)),
    };
    ReverseRecord { ip: ip.to_string(), names }
}

async fn lookup_mx(resolver: &TokioAsyncResolver, target: &str) -> ScanResult<Vec<MxRecord>> {
    debug!(target, "Looking up MX records.");
    match resolver.mx_lookup(target).await {
        Ok(lookup) => {
            let mut records: Vec<MxRecord> = lookup
                .iter()
                .map(|mx| MxRecord {
                    preference: mx.preference(),
                    exchange: mx.exchange().to_string().trim_end_matches('.').to_string(),
                })
                .collect();
            if records.is_empty() {
                return Ok(None);
            }
            records.sort_by(|a, b| a.preference.cmp(&b.preference).then_with(|| a.exchange.cmp(&b.exchange)));
            info!(count = %records.len(), "Found MX records.");
            Ok(Some(records))
        }
        Err(e) => empty_or_error(target, "MX", e),
    }
}

// "No records" comes back from hickory as an error kind; report it as `Ok(None)`.
fn empty_or_error<T>(name: &str, kind: &str, e: ResolveError) -> ScanResult<T> {
    if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
        debug!(name, kind, "No records found.");
        Ok(None)
    } else {
        warn!(name, kind, error = %e, "DNS lookup failed.");
        Err(format!("DNS Error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(results: &DnsResults) -> Vec<String> {
        analyze_dns_results(results).into_iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_unresolvable_target_is_critical() {
        let results = DnsResults::default();
        assert_eq!(codes(&results), vec!["DNS_NO_ADDRESS_RECORDS", "DNS_MX_MISSING"]);

        let failed = DnsResults {
            addresses: Err("DNS Error: timeout".to_string()),
            mx: Err("DNS Error: timeout".to_string()),
            ..DnsResults::default()
        };
        assert_eq!(codes(&failed), vec!["DNS_NO_ADDRESS_RECORDS"]);
    }

    #[test]
    fn test_resolved_target_with_reverse_names() {
        let results = DnsResults {
            addresses: Ok(Some(vec!["93.184.216.34".to_string()])),
            reverse: vec![ReverseRecord {
                ip: "93.184.216.34".to_string(),
                names: Ok(Some(vec!["edge.example.net".to_string()])),
            }],
            mx: Ok(Some(vec![MxRecord { preference: 10, exchange: "mx.example.com".to_string() }])),
            analysis: Vec::new(),
        };
        assert!(codes(&results).is_empty());
    }

    #[test]
    fn test_missing_reverse_names() {
        let results = DnsResults {
            addresses: Ok(Some(vec!["192.0.2.1".to_string()])),
            reverse: vec![ReverseRecord { ip: "192.0.2.1".to_string(), names: Ok(None) }],
            mx: Ok(Some(vec![MxRecord { preference: 0, exchange: "mail.example.com".to_string() }])),
            analysis: Vec::new(),
        };
        assert_eq!(codes(&results), vec!["DNS_NO_REVERSE_RECORDS"]);
    }
}
