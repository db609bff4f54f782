// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::parser::ParsedContent;

// --- Reusable Result Types ---
// A result that can hold an optional success value or a String error.
// `Ok(None)` means the lookup worked but found nothing.
pub type ScanResult<T> = Result<Option<T>, String>;

// --- Core Data Models ---

// Severity level of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

// A finding, identified by a knowledge-base code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisFinding {
    pub severity: Severity,
    pub code: String,
}

impl AnalysisFinding {
    pub fn new(severity: Severity, code: &str) -> Self {
        Self { severity, code: code.to_string() }
    }
}

// --- Website Content Models ---

// Result of fetching the landing page and analyzing its HTML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResults {
    pub url: String,
    pub page: ScanResult<ParsedContent>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for ContentResults {
    fn default() -> Self {
        Self {
            url: String::new(),
            page: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- DNS Models ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

// Reverse lookup for one resolved address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseRecord {
    pub ip: String,
    pub names: ScanResult<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsResults {
    pub addresses: ScanResult<Vec<String>>,
    pub reverse: Vec<ReverseRecord>,
    pub mx: ScanResult<Vec<MxRecord>>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for DnsResults {
    fn default() -> Self {
        Self {
            addresses: Ok(None),
            reverse: Vec::new(),
            mx: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- SSL/TLS Models ---

// Details extracted from a certificate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
    pub dns_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslData {
    pub is_valid: bool,
    pub certificate_info: CertificateInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslResults {
    pub scan: ScanResult<SslData>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for SslResults {
    fn default() -> Self {
        Self {
            scan: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- Certificate Transparency Models ---

// One crt.sh entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CtLogEntry {
    #[serde(default)]
    pub issuer_ca_id: i64,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub name_value: String,
    #[serde(default, alias = "id")]
    pub min_cert_id: i64,
    #[serde(default, alias = "entry_timestamp")]
    pub min_entry_timestamp: String,
    #[serde(default)]
    pub not_before: String,
    #[serde(default)]
    pub not_after: String,
}

// A logged certificate downloaded from crt.sh by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtCertificate {
    pub id: i64,
    pub details: ScanResult<CertificateInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtResults {
    pub entries: ScanResult<Vec<CtLogEntry>>,
    // Distinct names seen across all entries, sorted.
    pub names: Vec<String>,
    pub certificates: Vec<CtCertificate>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for CtResults {
    fn default() -> Self {
        Self {
            entries: Ok(None),
            names: Vec::new(),
            certificates: Vec::new(),
            analysis: Vec::new(),
        }
    }
}

// --- WHOIS Models ---

// Registration data read from the most specific WHOIS server that answered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoisRecord {
    pub registrar: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub registrant: Option<String>,
    pub status: Vec<String>,
    pub name_servers: Vec<String>,
    pub server: String,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisResults {
    pub record: ScanResult<WhoisRecord>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for WhoisResults {
    fn default() -> Self {
        Self {
            record: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- Geolocation Models ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub ip: String,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoResults {
    // Path of the City database used, if one was configured.
    pub database: Option<String>,
    pub locations: ScanResult<Vec<GeoLocation>>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for GeoResults {
    fn default() -> Self {
        Self {
            database: None,
            locations: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- Web Archive Models ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: String,
    pub original: String,
    pub status: String,
    pub archive_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaybackResults {
    pub snapshots: ScanResult<Vec<Snapshot>>,
    pub analysis: Vec<AnalysisFinding>,
}

impl Default for WaybackResults {
    fn default() -> Self {
        Self {
            snapshots: Ok(None),
            analysis: Vec::new(),
        }
    }
}

// --- Main Report ---

// Combines the results of every scanner for one target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub scanned_at: DateTime<Utc>,
    pub content_results: ContentResults,
    pub dns_results: DnsResults,
    pub geo_results: GeoResults,
    pub whois_results: WhoisResults,
    pub ssl_results: SslResults,
    pub ct_results: CtResults,
    pub wayback_results: WaybackResults,
}

impl ScanReport {
    /// Every finding from every scanner, in scanner order.
    pub fn all_findings(&self) -> impl Iterator<Item = &AnalysisFinding> {
        self.content_results
            .analysis
            .iter()
            .chain(&self.dns_results.analysis)
            .chain(&self.geo_results.analysis)
            .chain(&self.whois_results.analysis)
            .chain(&self.ssl_results.analysis)
            .chain(&self.ct_results.analysis)
            .chain(&self.wayback_results.analysis)
    }
}
