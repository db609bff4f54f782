// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info, warn};

use crate::core::models::{AnalysisFinding, CertificateInfo, Severity, SslData, SslResults, ScanResult};
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::net::TcpStream;
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

/// Connects to port 443, completes a TLS handshake and inspects the leaf certificate.
///
/// The handshake uses blocking I/O, so it runs on tokio's blocking pool.
pub async fn run_ssl_scan(target: &str) -> SslResults {
    info!(target, "Starting SSL/TLS scan.");
    let target_owned = target.to_string();

    debug!("Spawning blocking task for TLS connection.");
    let scan_result = spawn_blocking(move || perform_tls_scan(&target_owned))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking SSL scan task panicked!");
            Err(format!("Task panicked: {}", e))
        });

    debug!("SSL scan task finished, starting analysis.");
    let mut results = SslResults {
        scan: scan_result,
        analysis: Vec::new(),
    };

    results.analysis = analyze_ssl_results(&results);
    info!(findings = %results.analysis.len(), "SSL/TLS scan finished.");
    results
}

fn perform_tls_scan(target: &str) -> ScanResult<SslData> {
    debug!(target, "Performing TLS connection and handshake.");

    let connector = TlsConnector::new().map_err(|e| {
        error!(error = %e, "Failed to create TlsConnector");
        format!("TlsConnector Error: {}", e)
    })?;

    let stream = TcpStream::connect((target, 443)).map_err(|e| {
        error!(error = %e, "TCP connection failed");
        format!("TCP Connection Error: {}", e)
    })?;

    let stream = connector.connect(target, stream).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        format!("TLS Handshake Error: {}", e)
    })?;

    let cert = match stream.peer_certificate() {
        Ok(Some(c)) => c,
        Ok(None) => {
            debug!("TLS connection successful, but no peer certificate provided.");
            return Ok(None);
        }
        Err(e) => {
            error!(error = %e, "Failed to retrieve peer certificate from stream");
            return Err(format!("Could not get peer certificate: {}", e));
        }
    };

    let cert_der = cert.to_der().map_err(|e| {
        error!(error = %e, "Failed to convert certificate to DER format");
        format!("Could not convert certificate to DER: {}", e)
    })?;

    let (_, x509) = parse_x509_certificate(&cert_der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        format!("X.509 Parse Error: {}", e)
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");
    Ok(Some(certificate_data(&x509, Utc::now())))
}

/// Extracts the fields shown in the report from a parsed certificate, judged at `now`.
fn certificate_data(x509: &X509Certificate<'_>, now: DateTime<Utc>) -> SslData {
    let certificate_info = certificate_info(x509, now);
    SslData {
        is_valid: now > certificate_info.not_before && now < certificate_info.not_after,
        certificate_info,
    }
}

/// Subject, issuer, serial, validity window and SAN DNS names of a certificate.
pub(crate) fn certificate_info(x509: &X509Certificate<'_>, now: DateTime<Utc>) -> CertificateInfo {
    let validity = x509.validity();
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);

    CertificateInfo {
        subject_name: x509.subject().to_string(),
        issuer_name: x509.issuer().to_string(),
        serial: x509.raw_serial_as_string(),
        not_before: asn1_time_to_chrono_utc(&validity.not_before),
        not_after,
        days_until_expiry: not_after.signed_duration_since(now).num_days(),
        dns_names: dns_names(x509),
    }
}

fn dns_names(x509: &X509Certificate<'_>) -> Vec<String> {
    match x509.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Malformed subjectAltName extension");
            Vec::new()
        }
    }
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

fn analyze_ssl_results(results: &SslResults) -> Vec<AnalysisFinding> {
    debug!("Analyzing SSL scan results.");
    let mut analyses = Vec::new();

    match &results.scan {
        Err(_) => {
            debug!("Scan failed, adding SSL_HANDSHAKE_FAILED finding.");
            analyses.push(AnalysisFinding::new(Severity::Critical, "SSL_HANDSHAKE_FAILED"));
        }
        Ok(None) => {
            debug!("No certificate found, adding SSL_NO_CERTIFICATE_FOUND finding.");
            analyses.push(AnalysisFinding::new(Severity::Warning, "SSL_NO_CERTIFICATE_FOUND"));
        }
        Ok(Some(ssl_data)) => {
            if !ssl_data.is_valid {
                debug!(expiry_date = %ssl_data.certificate_info.not_after, "Certificate is expired, adding SSL_EXPIRED finding.");
                analyses.push(AnalysisFinding::new(Severity::Critical, "SSL_EXPIRED"));
            }

            let days_left = ssl_data.certificate_info.days_until_expiry;
            if (0..=30).contains(&days_left) {
                debug!(days_left, "Certificate is expiring soon, adding SSL_EXPIRING_SOON finding.");
                analyses.push(AnalysisFinding::new(Severity::Warning, "SSL_EXPIRING_SOON"));
            }
        }
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn results_with(is_valid: bool, days_until_expiry: i64) -> SslResults {
        let now = Utc::now();
        SslResults {
            scan: Ok(Some(SslData {
                is_valid,
                certificate_info: CertificateInfo {
                    subject_name: "CN=example.com".to_string(),
                    issuer_name: "CN=Example CA".to_string(),
                    serial: "01:02".to_string(),
                    not_before: now - Duration::days(90),
                    not_after: now + Duration::days(days_until_expiry),
                    days_until_expiry,
                    dns_names: vec!["example.com".to_string(), "www.example.com".to_string()],
                },
            })),
            analysis: Vec::new(),
        }
    }

    fn codes(results: &SslResults) -> Vec<String> {
        analyze_ssl_results(results).into_iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_healthy_certificate() {
        assert!(codes(&results_with(true, 200)).is_empty());
    }

    #[test]
    fn test_expiring_and_expired() {
        assert_eq!(codes(&results_with(true, 10)), vec!["SSL_EXPIRING_SOON"]);
        assert_eq!(codes(&results_with(false, -3)), vec!["SSL_EXPIRED"]);
    }

    #[test]
    fn test_handshake_failure_and_missing_certificate() {
        let failed = SslResults { scan: Err("TLS Handshake Error".to_string()), analysis: Vec::new() };
        assert_eq!(codes(&failed), vec!["SSL_HANDSHAKE_FAILED"]);
        assert_eq!(codes(&SslResults::default()), vec!["SSL_NO_CERTIFICATE_FOUND"]);
    }
}
