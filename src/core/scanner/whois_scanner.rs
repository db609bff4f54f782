// src/core/scanner/whois_scanner.rs

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::ReconConfig;
use crate::core::models::{AnalysisFinding, ScanResult, Severity, WhoisRecord, WhoisResults};

const IANA_WHOIS_SERVER: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;
// Registry answers beyond this size are truncated.
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

const NO_MATCH_MARKERS: &[&str] = &["no match for", "not found", "no data found", "no entries found"];

/// Looks up the registration record of the target domain.
///
/// IANA names the registry's WHOIS server, and a thick registry may name the
/// registrar's server in turn. The most specific answer that parses is kept.
pub async fn run_whois_scan(target: &str, config: &ReconConfig) -> WhoisResults {
    info!(target, "Starting WHOIS scan.");

    let mut results = WhoisResults {
        record: lookup(target, config.whois_timeout()).await,
        analysis: Vec::new(),
    };
    results.analysis = analyze_whois_results(&results, Utc::now());
    info!(findings = %results.analysis.len(), "WHOIS scan finished.");
    results
}

async fn lookup(domain: &str, limit: Duration) -> ScanResult<WhoisRecord> {
    let iana = query(IANA_WHOIS_SERVER, domain, limit).await?;
    let Some(registry) = referral(&iana) else {
        warn!(domain, "IANA did not name a WHOIS server.");
        return Ok(None);
    };

    let raw = query(&registry, domain, limit).await?;
    if is_no_match(&raw) {
        debug!(server = %registry, "Registry has no record.");
        return Ok(None);
    }
    let mut record = parse_record(&raw, &registry);

    if let Some(registrar) = referral(&raw).filter(|server| !server.eq_ignore_ascii_case(&registry)) {
        match query(&registrar, domain, limit).await {
            Ok(detail) if !is_no_match(&detail) => record = merge(parse_record(&detail, &registrar), record),
            Ok(_) => debug!(server = %registrar, "Registrar has no record, keeping registry answer."),
            Err(e) => warn!(server = %registrar, error = %e, "Registrar query failed, keeping registry answer."),
        }
    }
    Ok(Some(record))
}

async fn query(server: &str, domain: &str, limit: Duration) -> Result<String, String> {
    debug!(server, domain, "Sending WHOIS query.");
    let exchange = async {
        let mut stream = TcpStream::connect((server, WHOIS_PORT)).await?;
        stream.write_all(format!("{}\r\n", domain).as_bytes()).await?;
        let mut body = Vec::new();
        stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut body).await?;
        Ok::<_, std::io::Error>(body)
    };

    match timeout(limit, exchange).await {
        Ok(Ok(body)) => Ok(String::from_utf8_lossy(&body).into_owned()),
        Ok(Err(e)) => {
            error!(server, error = %e, "WHOIS query failed");
            Err(format!("WHOIS query to {} failed: {}", server, e))
        }
        Err(_) => {
            warn!(server, "WHOIS query timed out.");
            Err(format!("WHOIS query to {} timed out", server))
        }
    }
}

/// Splits a `key: value` line, lowercasing the key.
fn field(line: &str) -> Option<(String, &str)> {
    let (key, value) = line.split_once(':')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key.trim().to_ascii_lowercase(), value))
}

/// The next server to ask, from an IANA `refer:` or a registry's registrar line.
fn referral(raw: &str) -> Option<String> {
    raw.lines()
        .filter_map(field)
        .find(|(key, _)| matches!(key.as_str(), "refer" | "whois" | "registrar whois server"))
        .map(|(_, value)| {
            let value = value.trim_start_matches("whois://");
            value.split(['/', ' ']).next().unwrap_or(value).to_ascii_lowercase()
        })
        .filter(|server| !server.is_empty())
}

fn is_no_match(raw: &str) -> bool {
    let lowered = raw.to_ascii_lowercase();
    NO_MATCH_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Reads the common fields out of a free-form WHOIS answer. The first value wins
/// for single fields; statuses and name servers accumulate without duplicates.
fn parse_record(raw: &str, server: &str) -> WhoisRecord {
    let mut record = WhoisRecord {
        server: server.to_string(),
        raw: raw.to_string(),
        ..WhoisRecord::default()
    };

    for (key, value) in raw.lines().map(str::trim).filter(|line| !line.starts_with(['%', '#', '>'])).filter_map(field) {
        match key.as_str() {
            "registrar" | "registrar name" | "sponsoring registrar" => {
                record.registrar.get_or_insert_with(|| value.to_string());
            }
            "creation date" | "created" | "created on" | "registered on" | "registration time" => {
                if record.created.is_none() {
                    record.created = parse_date(value);
                }
            }
            "registry expiry date" | "registrar registration expiration date" | "expiration date"
            | "expiry date" | "expires" | "expires on" | "paid-till" => {
                if record.expires.is_none() {
                    record.expires = parse_date(value);
                }
            }
            "updated date" | "last updated" | "last-modified" | "changed" => {
                if record.updated.is_none() {
                    record.updated = parse_date(value);
                }
            }
            "registrant organization" | "registrant name" | "registrant" | "org" => {
                record.registrant.get_or_insert_with(|| value.to_string());
            }
            "domain status" | "status" => {
                // "clientTransferProhibited https://icann.org/epp#..."
                let status = value.split_whitespace().next().unwrap_or(value).to_string();
                if !record.status.contains(&status) {
                    record.status.push(status);
                }
            }
            "name server" | "nserver" | "nameserver" => {
                let name = value.split_whitespace().next().unwrap_or(value).trim_end_matches('.').to_ascii_lowercase();
                if !record.name_servers.contains(&name) {
                    record.name_servers.push(name);
                }
            }
            _ => {}
        }
    }
    record
}

// Registrar answers are more detailed; registry values fill their gaps.
fn merge(detail: WhoisRecord, registry: WhoisRecord) -> WhoisRecord {
    WhoisRecord {
        registrar: detail.registrar.or(registry.registrar),
        created: detail.created.or(registry.created),
        expires: detail.expires.or(registry.expires),
        updated: detail.updated.or(registry.updated),
        registrant: detail.registrant.or(registry.registrant),
        status: if detail.status.is_empty() { registry.status } else { detail.status },
        name_servers: if detail.name_servers.is_empty() { registry.name_servers } else { detail.name_servers },
        server: detail.server,
        raw: detail.raw,
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y.%m.%d %H:%M:%S",
        "%Y-%m-%d",
        "%Y.%m.%d",
        "%d-%b-%Y",
        "%d/%m/%Y",
    ];
    // Some registries append the zone in brackets ("2024-05-01 12:00:00 (GMT+0:00)").
    let value = value.split(" (").next().unwrap_or(value).trim();
    FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .map(|naive| naive.and_utc())
            .or_else(|_| NaiveDate::parse_from_str(value, format).map(|date| date.and_time(Default::default()).and_utc()))
            .ok()
    })
}

fn analyze_whois_results(results: &WhoisResults, now: DateTime<Utc>) -> Vec<AnalysisFinding> {
    debug!("Analyzing WHOIS results.");
    let mut analyses = Vec::new();

    let record = match &results.record {
        Err(_) => {
            debug!("Lookup failed, adding WHOIS_LOOKUP_FAILED finding.");
            analyses.push(AnalysisFinding::new(Severity::Info, "WHOIS_LOOKUP_FAILED"));
            return analyses;
        }
        Ok(None) => {
            debug!("No record, adding WHOIS_NO_RECORD finding.");
            analyses.push(AnalysisFinding::new(Severity::Info, "WHOIS_NO_RECORD"));
            return analyses;
        }
        Ok(Some(record)) => record,
    };

    if let Some(expires) = record.expires {
        let days_left = expires.signed_duration_since(now).num_days();
        if expires < now {
            debug!(%expires, "Registration lapsed, adding WHOIS_DOMAIN_EXPIRED finding.");
            analyses.push(AnalysisFinding::new(Severity::Critical, "WHOIS_DOMAIN_EXPIRED"));
        } else if days_left <= 30 {
            debug!(days_left, "Registration ends soon, adding WHOIS_DOMAIN_EXPIRING_SOON finding.");
            analyses.push(AnalysisFinding::new(Severity::Warning, "WHOIS_DOMAIN_EXPIRING_SOON"));
        }
    }

    let transfer_locked = record
        .status
        .iter()
        .any(|status| status.to_ascii_lowercase().ends_with("transferprohibited"));
    if !record.status.is_empty() && !transfer_locked {
        debug!("No transfer lock, adding WHOIS_TRANSFER_UNLOCKED finding.");
        analyses.push(AnalysisFinding::new(Severity::Warning, "WHOIS_TRANSFER_UNLOCKED"));
    }

    analyses
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const IANA_ANSWER: &str = "% IANA WHOIS server\n\
        % for more information on IANA, visit http://www.iana.org\n\
        \n\
        domain:       COM\n\
        organisation: VeriSign Global Registry Services\n\
        refer:        whois.verisign-grs.com\n\
        status:       ACTIVE\n";

    const REGISTRY_ANSWER: &str = "   Domain Name: EXAMPLE.COM\r\n\
        \x20  Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r\n\
        \x20  Registrar WHOIS Server: whois.iana.org\r\n\
        \x20  Updated Date: 2024-08-14T07:01:34Z\r\n\
        \x20  Creation Date: 1995-08-14T04:00:00Z\r\n\
        \x20  Registry Expiry Date: 2025-08-13T04:00:00Z\r\n\
        \x20  Registrar: RESERVED-Internet Assigned Numbers Authority\r\n\
        \x20  Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r\n\
        \x20  Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n\
        \x20  Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n\
        \x20  Name Server: A.IANA-SERVERS.NET\r\n\
        \x20  Name Server: B.IANA-SERVERS.NET\r\n\
        >>> Last update of whois database: 2024-10-01T10:00:00Z <<<\r\n";

    fn record_expiring(expires: DateTime<Utc>, status: &[&str]) -> WhoisResults {
        WhoisResults {
            record: Ok(Some(WhoisRecord {
                expires: Some(expires),
                status: status.iter().map(|s| s.to_string()).collect(),
                ..WhoisRecord::default()
            })),
            analysis: Vec::new(),
        }
    }

    fn codes(results: &WhoisResults, now: DateTime<Utc>) -> Vec<String> {
        analyze_whois_results(results, now).into_iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_referral_servers() {
        assert_eq!(referral(IANA_ANSWER).as_deref(), Some("whois.verisign-grs.com"));
        assert_eq!(referral(REGISTRY_ANSWER).as_deref(), Some("whois.iana.org"));
        assert_eq!(referral("Registrar WHOIS Server: whois://Whois.Example.net/\n").as_deref(), Some("whois.example.net"));
        assert_eq!(referral("domain: EXAMPLE\nrefer:\n"), None);
    }

    #[test]
    fn test_parses_registry_answer() {
        let record = parse_record(REGISTRY_ANSWER, "whois.verisign-grs.com");
        assert_eq!(record.registrar.as_deref(), Some("RESERVED-Internet Assigned Numbers Authority"));
        assert_eq!(record.created, Some(Utc.with_ymd_and_hms(1995, 8, 14, 4, 0, 0).unwrap()));
        assert_eq!(record.expires, Some(Utc.with_ymd_and_hms(2025, 8, 13, 4, 0, 0).unwrap()));
        assert_eq!(record.updated, Some(Utc.with_ymd_and_hms(2024, 8, 14, 7, 1, 34).unwrap()));
        assert_eq!(record.status, vec!["clientDeleteProhibited", "clientTransferProhibited"]);
        assert_eq!(record.name_servers, vec!["a.iana-servers.net", "b.iana-servers.net"]);
        assert_eq!(record.server, "whois.verisign-grs.com");
    }

    #[test]
    fn test_date_formats() {
        let day = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2026-03-01"), Some(day));
        assert_eq!(parse_date("01-Mar-2026"), Some(day));
        assert_eq!(parse_date("2026.03.01"), Some(day));
        assert_eq!(parse_date("2026-03-01T00:00:00+00:00"), Some(day));
        assert_eq!(parse_date("2026-03-01 00:00:00 (GMT+0:00)"), Some(day));
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn test_registrar_answer_takes_precedence() {
        let registry = parse_record(REGISTRY_ANSWER, "whois.verisign-grs.com");
        let detail = parse_record("Registrar: Example Registrar, Inc.\nRegistrant Organization: Example Org\n", "whois.example.net");
        let merged = merge(detail, registry);
        assert_eq!(merged.registrar.as_deref(), Some("Example Registrar, Inc."));
        assert_eq!(merged.registrant.as_deref(), Some("Example Org"));
        assert_eq!(merged.name_servers.len(), 2);
        assert_eq!(merged.server, "whois.example.net");
    }

    #[test]
    fn test_no_match_answers() {
        assert!(is_no_match("No match for \"UNREGISTERED-EXAMPLE.COM\".\r\n"));
        assert!(is_no_match("%% NOT FOUND\n"));
        assert!(!is_no_match(REGISTRY_ANSWER));
    }

    #[test]
    fn test_expiry_findings() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let locked = ["clientTransferProhibited"];
        assert_eq!(codes(&record_expiring(now + chrono::Duration::days(12), &locked), now), vec!["WHOIS_DOMAIN_EXPIRING_SOON"]);
        assert_eq!(codes(&record_expiring(now - chrono::Duration::days(1), &locked), now), vec!["WHOIS_DOMAIN_EXPIRED"]);
        assert!(codes(&record_expiring(now + chrono::Duration::days(300), &locked), now).is_empty());
    }

    #[test]
    fn test_transfer_lock_finding() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = now + chrono::Duration::days(365);
        assert_eq!(codes(&record_expiring(later, &["ok"]), now), vec!["WHOIS_TRANSFER_UNLOCKED"]);
        assert!(codes(&record_expiring(later, &["serverTransferProhibited"]), now).is_empty());
        assert!(codes(&record_expiring(later, &[]), now).is_empty());
    }

    #[test]
    fn test_failed_and_missing_record() {
        let now = Utc::now();
        let failed = WhoisResults { record: Err("timed out".to_string()), analysis: Vec::new() };
        assert_eq!(codes(&failed, now), vec!["WHOIS_LOOKUP_FAILED"]);
        assert_eq!(codes(&WhoisResults::default(), now), vec!["WHOIS_NO_RECORD"]);
    }
}
