// src/core/scanner/ct_scanner.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use x509_parser::pem::parse_x509_pem;

use crate::config::ReconConfig;
use crate::core::models::{AnalysisFinding, CertificateInfo, CtCertificate, CtLogEntry, CtResults, ScanResult, Severity};
use super::http_client;
use super::ssl_scanner::certificate_info;

const CRT_SH_URL: &str = "https://crt.sh/";

/// Queries crt.sh for certificates issued to the target and collects the names they cover.
///
/// The PEM of the first `ct_certificate_limit` logged certificates is then
/// downloaded and decoded, one request at a time.
///
/// # Arguments
/// * `target` - The hostname to search for.
/// * `config` - HTTP settings, the maximum number of entries kept and the
///   number of certificates downloaded.
pub async fn run_ct_scan(target: &str, config: &ReconConfig) -> CtResults {
    info!(target, "Starting certificate transparency scan.");

    let client = http_client(config);
    let entries = match &client {
        Ok(client) => fetch_entries(client, target, config.ct_log_limit).await,
        Err(e) => Err(e.clone()),
    };

    let (names, certificates) = match (&client, &entries) {
        (Ok(client), Ok(Some(entries))) => {
            let ids = certificate_ids(entries, config.ct_certificate_limit);
            (distinct_names(entries), fetch_certificates(client, &ids).await)
        }
        _ => (Vec::new(), Vec::new()),
    };

    let mut results = CtResults {
        entries,
        names,
        certificates,
        analysis: Vec::new(),
    };
    results.analysis = analyze_ct_results(&results);
    info!(findings = %results.analysis.len(), names = %results.names.len(), "Certificate transparency scan finished.");
    results
}

async fn fetch_entries(client: &reqwest::Client, target: &str, limit: usize) -> ScanResult<Vec<CtLogEntry>> {
    debug!(target, "Querying crt.sh.");
    let response = client
        .get(CRT_SH_URL)
        .query(&[("q", target), ("output", "json")])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "crt.sh request failed");
            format!("crt.sh request failed: {}", e)
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, "crt.sh returned an error status.");
        return Err(format!("crt.sh returned status code {}", status.as_u16()));
    }

    let body = response.text().await.map_err(|e| {
        error!(error = %e, "Failed to read crt.sh response");
        format!("failed to read crt.sh response: {}", e)
    })?;

    parse_entries(&body, limit)
}

/// Decodes a crt.sh JSON array, keeping at most `limit` entries.
fn parse_entries(body: &str, limit: usize) -> ScanResult<Vec<CtLogEntry>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let mut entries: Vec<CtLogEntry> = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Could not decode crt.sh response");
        format!("invalid crt.sh response: {}", e)
    })?;

    if entries.is_empty() {
        return Ok(None);
    }
    if entries.len() > limit {
        debug!(total = %entries.len(), limit, "Truncating crt.sh entries.");
        entries.truncate(limit);
    }
    Ok(Some(entries))
}

// First `limit` distinct certificate ids, in crt.sh order.
fn certificate_ids(entries: &[CtLogEntry], limit: usize) -> Vec<i64> {
    let mut seen = BTreeSet::new();
    entries
        .iter()
        .map(|entry| entry.min_cert_id)
        .filter(|id| *id > 0 && seen.insert(*id))
        .take(limit)
        .collect()
}

async fn fetch_certificates(client: &reqwest::Client, ids: &[i64]) -> Vec<CtCertificate> {
    let mut certificates = Vec::with_capacity(ids.len());
    for &id in ids {
        let details = fetch_certificate(client, id).await;
        if let Err(e) = &details {
            warn!(id, error = %e, "Certificate download failed.");
        }
        certificates.push(CtCertificate { id, details });
    }
    debug!(count = %certificates.len(), "Certificates downloaded.");
    certificates
}

async fn fetch_certificate(client: &reqwest::Client, id: i64) -> ScanResult<CertificateInfo> {
    debug!(id, "Downloading certificate from crt.sh.");
    let response = client
        .get(CRT_SH_URL)
        .query(&[("d", id.to_string())])
        .send()
        .await
        .map_err(|e| {
            error!(id, error = %e, "crt.sh certificate request failed");
            format!("crt.sh certificate request failed: {}", e)
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("crt.sh returned status code {} for certificate {}", status.as_u16(), id));
    }

    let body = response.bytes().await.map_err(|e| {
        error!(id, error = %e, "Failed to read certificate body");
        format!("failed to read certificate {}: {}", id, e)
    })?;

    parse_pem_certificate(&body, Utc::now())
}

/// Decodes one PEM-armoured certificate, judged at `now`.
fn parse_pem_certificate(body: &[u8], now: DateTime<Utc>) -> ScanResult<CertificateInfo> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let (_, pem) = parse_x509_pem(body).map_err(|e| format!("invalid PEM: {}", e))?;
    let x509 = pem.parse_x509().map_err(|e| format!("X.509 Parse Error: {}", e))?;
    Ok(Some(certificate_info(&x509, now)))
}

// `name_value` holds one name per line.
fn distinct_names(entries: &[CtLogEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| entry.name_value.lines())
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn analyze_ct_results(results: &CtResults) -> Vec<AnalysisFinding> {
    let mut analyses = Vec::new();

    if results.entries.is_err() {
        debug!("Lookup failed, adding CT_LOOKUP_FAILED finding.");
        analyses.push(AnalysisFinding::new(Severity::Info, "CT_LOOKUP_FAILED"));
    }
    if results.names.iter().any(|name| name.starts_with("*.")) {
        debug!("Wildcard name found, adding CT_WILDCARD_CERTIFICATE finding.");
        analyses.push(AnalysisFinding::new(Severity::Info, "CT_WILDCARD_CERTIFICATE"));
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"[
        {"issuer_ca_id":183267,"issuer_name":"C=US, O=Let's Encrypt, CN=R3","common_name":"example.com",
         "name_value":"example.com\nwww.example.com","id":9876543210,"entry_timestamp":"2024-01-02T03:04:05.678",
         "not_before":"2024-01-02T02:04:05","not_after":"2024-04-01T02:04:04","serial_number":"03ab"},
        {"issuer_ca_id":183267,"issuer_name":"C=US, O=Let's Encrypt, CN=R3",
         "name_value":"*.Example.com\nexample.com","min_cert_id":1234,"min_entry_timestamp":"2023-10-02T03:04:05",
         "not_before":"2023-10-02T02:04:05","not_after":"2023-12-31T02:04:04"}
    ]"#;

    // Self-signed, SANs example.com, www.example.com and *.cdn.example.com.
    const FIXTURE_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIB+DCCAZ6gAwIBAgIDGis8MAoGCCqGSM49BAMCMDsxCzAJBgNVBAYTAlVTMRYw
FAYDVQQKDA1WYW5ndWFyZCBUZXN0MRQwEgYDVQQDDAtleGFtcGxlLmNvbTAeFw0y
NjEwMTkxMTAyMTdaFw0zNjEwMTYxMTAyMTdaMDsxCzAJBgNVBAYTAlVTMRYwFAYD
VQQKDA1WYW5ndWFyZCBUZXN0MRQwEgYDVQQDDAtleGFtcGxlLmNvbTBZMBMGByqG
SM49AgEGCCqGSM49AwEHA0IABIJgmCzbq5VXLWL18evdi5oMnTOWQBD9QUV22+0e
2FwMSOTjvfyHorrGbM0jgyCManS8RnCADkZJJvmBlvRqRT6jgZAwgY0wHQYDVR0O
BBYEFK0KJ4bo+xLZ3ib6hfPmZAp5O9R2MB8GA1UdIwQYMBaAFK0KJ4bo+xLZ3ib6
hfPmZAp5O9R2MA8GA1UdEwEB/wQFMAMBAf8wOgYDVR0RBDMwMYILZXhhbXBsZS5j
b22CD3d3dy5leGFtcGxlLmNvbYIRKi5jZG4uZXhhbXBsZS5jb20wCgYIKoZIzj0E
AwIDSAAwRQIgKjqXh0o+s7+wuoI3qwQ8EemvmvQvLzMZ6BkjFFjgFQkCIQCoLDbS
/X6yScdMNuMjX/fgcxcbBV3BV3zQbGEELelCEA==
-----END CERTIFICATE-----
";

    #[test]
    fn test_parses_both_field_spellings() {
        let entries = parse_entries(SAMPLE, 100).unwrap().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].min_cert_id, 9876543210);
        assert_eq!(entries[0].min_entry_timestamp, "2024-01-02T03:04:05.678");
        assert_eq!(entries[1].min_cert_id, 1234);
    }

    #[test]
    fn test_limit_and_empty_bodies() {
        assert_eq!(parse_entries(SAMPLE, 1).unwrap().unwrap().len(), 1);
        assert_eq!(parse_entries("[]", 10).unwrap(), None);
        assert_eq!(parse_entries("", 10).unwrap(), None);
        assert!(parse_entries("<html>rate limited</html>", 10).is_err());
    }

    #[test]
    fn test_names_are_distinct_and_sorted() {
        let entries = parse_entries(SAMPLE, 100).unwrap().unwrap();
        assert_eq!(distinct_names(&entries), vec!["*.example.com", "example.com", "www.example.com"]);
    }

    #[test]
    fn test_certificate_ids_are_distinct_and_capped() {
        let mut entries = parse_entries(SAMPLE, 100).unwrap().unwrap();
        entries.push(entries[0].clone());
        entries.push(CtLogEntry { min_cert_id: 0, ..entries[1].clone() });

        assert_eq!(certificate_ids(&entries, 5), vec![9876543210, 1234]);
        assert_eq!(certificate_ids(&entries, 1), vec![9876543210]);
        assert!(certificate_ids(&entries, 0).is_empty());
    }

    #[test]
    fn test_decodes_downloaded_pem() {
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        let info = parse_pem_certificate(FIXTURE_PEM.as_bytes(), now).unwrap().unwrap();

        assert_eq!(info.subject_name, "C=US, O=Vanguard Test, CN=example.com");
        assert_eq!(info.issuer_name, info.subject_name);
        assert_eq!(info.serial, "1a:2b:3c");
        assert_eq!(info.not_before, Utc.with_ymd_and_hms(2026, 10, 19, 11, 2, 17).unwrap());
        assert_eq!(info.not_after, Utc.with_ymd_and_hms(2036, 10, 16, 11, 2, 17).unwrap());
        assert_eq!(info.dns_names, vec!["example.com", "www.example.com", "*.cdn.example.com"]);
    }

    #[test]
    fn test_rejects_non_pem_bodies() {
        let now = Utc::now();
        assert_eq!(parse_pem_certificate(b"  \n", now), Ok(None));
        assert!(parse_pem_certificate(b"<html>Certificate not found</html>", now).is_err());

        let truncated = FIXTURE_PEM.replace("AwIDSAAwRQIgKjqXh0o+s7+wuoI3qwQ8EemvmvQvLzMZ6BkjFFjgFQkCIQCoLDbS\n", "");
        assert!(parse_pem_certificate(truncated.as_bytes(), now).is_err());
    }

    #[test]
    fn test_findings() {
        let entries = parse_entries(SAMPLE, 100).unwrap().unwrap();
        let results = CtResults {
            names: distinct_names(&entries),
            entries: Ok(Some(entries)),
            certificates: Vec::new(),
            analysis: Vec::new(),
        };
        let codes: Vec<String> = analyze_ct_results(&results).into_iter().map(|f| f.code).collect();
        assert_eq!(codes, vec!["CT_WILDCARD_CERTIFICATE"]);

        let failed = CtResults { entries: Err("timeout".to_string()), ..CtResults::default() };
        let codes: Vec<String> = analyze_ct_results(&failed).into_iter().map(|f| f.code).collect();
        assert_eq!(codes, vec!["CT_LOOKUP_FAILED"]);
    }
}
