//! This module holds the static, read-only catalogue of every finding a scan can
//! produce, with a human-readable title, an explanation and a remediation hint.
//! Scanners only emit codes; the report view looks the details up here.

use crate::core::models::Severity;
use strum::Display;

/// High-level grouping of findings, used for section titles in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum FindingCategory {
    #[strum(to_string = "Website Content")]
    Content,
    #[strum(to_string = "DNS")]
    Dns,
    #[strum(to_string = "Geolocation")]
    Geolocation,
    #[strum(to_string = "WHOIS")]
    Whois,
    #[strum(to_string = "SSL/TLS Certificate")]
    Ssl,
    #[strum(to_string = "Certificate Transparency")]
    CertificateTransparency,
    #[strum(to_string = "Web Archive")]
    Archive,
}

/// Everything needed to present one finding to the user.
pub struct FindingDetail {
    /// Machine-readable identifier (e.g., "CONTENT_EMAILS_EXPOSED").
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    pub description: &'static str,
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- Website Content ---
    FindingDetail {
        code: "CONTENT_FETCH_FAILED",
        title: "Landing Page Unreachable",
        category: FindingCategory::Content,
        severity: Severity::Warning,
        description: "The landing page could not be retrieved over HTTPS, or it answered with a status other than 200. None of the content intelligence (contacts, links, technologies) could be gathered.",
        remediation: "Check that the site serves its main page over HTTPS and is not blocking automated clients. Retry with a longer timeout if the server is slow."
    },
    FindingDetail {
        code: "CONTENT_EMAILS_EXPOSED",
        title: "Email Addresses Published",
        category: FindingCategory::Content,
        severity: Severity::Info,
        description: "The page links to one or more email addresses through mailto: links. Published addresses are routinely harvested for spam and phishing campaigns.",
        remediation: "Prefer a contact form or a role address (e.g., info@) that is filtered, and avoid publishing personal mailboxes."
    },
    FindingDetail {
        code: "CONTENT_PHONES_EXPOSED",
        title: "Phone Numbers Published",
        category: FindingCategory::Content,
        severity: Severity::Info,
        description: "The page links to one or more phone numbers through tel: links. They are useful for social-engineering pretexts and vishing.",
        remediation: "Publish only switchboard or support numbers, and make sure staff answering them are trained to verify callers."
    },
    FindingDetail {
        code: "CONTENT_COMMENTS_PRESENT",
        title: "HTML Comments in Production Markup",
        category: FindingCategory::Content,
        severity: Severity::Info,
        description: "The delivered HTML contains comments. Comments often leak build details, internal hostnames, TODO notes or disabled features.",
        remediation: "Strip comments during the build or minification step so they never reach visitors."
    },
    FindingDetail {
        code: "CONTENT_INSECURE_FORM_ACTION",
        title: "Form Submits Over Plain HTTP",
        category: FindingCategory::Content,
        severity: Severity::Warning,
        description: "At least one form posts its data to an http:// URL. Anything typed into it travels unencrypted and can be read or altered in transit.",
        remediation: "Point every form action at an https:// endpoint, or use a relative action so it inherits the page's secure origin."
    },
    FindingDetail {
        code: "CONTENT_INSECURE_SCRIPT",
        title: "Script Loaded Over Plain HTTP",
        category: FindingCategory::Content,
        severity: Severity::Warning,
        description: "The page loads JavaScript from an http:// URL. A network attacker can replace that script and take full control of the page.",
        remediation: "Serve all scripts over HTTPS and consider Subresource Integrity for third-party files."
    },

    // --- DNS ---
    FindingDetail {
        code: "DNS_NO_ADDRESS_RECORDS",
        title: "No Address Records",
        category: FindingCategory::Dns,
        severity: Severity::Critical,
        description: "The domain did not resolve to any IPv4 or IPv6 address. Visitors cannot reach it by name.",
        remediation: "Add A and/or AAAA records for the domain at your DNS provider, or fix the delegation if the zone is not being served."
    },
    FindingDetail {
        code: "DNS_NO_REVERSE_RECORDS",
        title: "No Reverse DNS",
        category: FindingCategory::Dns,
        severity: Severity::Info,
        description: "None of the resolved addresses has a PTR record. Reverse DNS helps identify hosting providers and is expected by many mail receivers.",
        remediation: "Ask the owner of the IP range (usually the hosting provider) to publish PTR records for the addresses you use."
    },
    FindingDetail {
        code: "DNS_MX_MISSING",
        title: "No Mail Exchanger",
        category: FindingCategory::Dns,
        severity: Severity::Info,
        description: "The domain publishes no MX records, so it cannot receive email directly. Published addresses on the site may bounce.",
        remediation: "If the domain should receive mail, add MX records pointing at your mail provider. Otherwise publish a null MX ('0 .')."
    },

    // --- Geolocation ---
    FindingDetail {
        code: "GEO_DATABASE_UNAVAILABLE",
        title: "Geolocation Skipped",
        category: FindingCategory::Geolocation,
        severity: Severity::Info,
        description: "No GeoLite2/GeoIP2 City database is configured, so the resolved addresses were not located.",
        remediation: "Download the free GeoLite2 City database from MaxMind and set `geolite_db_path` in config.json."
    },
    FindingDetail {
        code: "GEO_LOOKUP_FAILED",
        title: "Geolocation Database Unreadable",
        category: FindingCategory::Geolocation,
        severity: Severity::Info,
        description: "The configured GeoLite database could not be opened or is not a MaxMind DB file.",
        remediation: "Check that `geolite_db_path` points at an .mmdb file (not the .tar.gz archive) and that it is readable."
    },
    FindingDetail {
        code: "GEO_MULTIPLE_COUNTRIES",
        title: "Addresses in Several Countries",
        category: FindingCategory::Geolocation,
        severity: Severity::Info,
        description: "The domain resolves to addresses located in more than one country. This is typical of CDNs and anycast, and can matter for data-residency requirements.",
        remediation: "Confirm that every hosting location is expected and allowed for the data the site handles."
    },

    // --- WHOIS ---
    FindingDetail {
        code: "WHOIS_LOOKUP_FAILED",
        title: "WHOIS Lookup Failed",
        category: FindingCategory::Whois,
        severity: Severity::Info,
        description: "No WHOIS server answered in time. Some registries rate-limit or block port 43 queries.",
        remediation: "Retry later. No action is needed on the target itself."
    },
    FindingDetail {
        code: "WHOIS_NO_RECORD",
        title: "No Registration Record",
        category: FindingCategory::Whois,
        severity: Severity::Info,
        description: "The registry returned no record for the domain, or IANA knows no WHOIS server for its TLD. Subdomains and some ccTLDs behave this way.",
        remediation: "Query the registered parent domain, or check the registry's RDAP service."
    },
    FindingDetail {
        code: "WHOIS_DOMAIN_EXPIRED",
        title: "Domain Registration Expired",
        category: FindingCategory::Whois,
        severity: Severity::Critical,
        description: "The registration expiry date is in the past. An expired domain can be dropped and registered by anyone, including attackers who then receive its mail and traffic.",
        remediation: "Renew the registration immediately and enable auto-renew with the registrar."
    },
    FindingDetail {
        code: "WHOIS_DOMAIN_EXPIRING_SOON",
        title: "Domain Registration Expiring Soon",
        category: FindingCategory::Whois,
        severity: Severity::Warning,
        description: "The domain registration expires within 30 days.",
        remediation: "Renew the registration and enable auto-renew with a valid payment method."
    },
    FindingDetail {
        code: "WHOIS_TRANSFER_UNLOCKED",
        title: "No Transfer Lock",
        category: FindingCategory::Whois,
        severity: Severity::Warning,
        description: "None of the domain's EPP statuses prohibits transfers. An attacker with access to the registrar account or auth code can move the domain away.",
        remediation: "Ask the registrar to set clientTransferProhibited (registrar lock) on the domain."
    },

    // --- SSL/TLS ---
    FindingDetail {
        code: "SSL_HANDSHAKE_FAILED",
        title: "TLS Handshake Failed",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        description: "The scanner could not establish a secure TLS connection with the server. This can be caused by an invalid or missing certificate, unsupported cipher suites, or the port being closed.",
        remediation: "Ensure a valid, trusted certificate is installed for the correct domain and that port 443 is reachable."
    },
    FindingDetail {
        code: "SSL_NO_CERTIFICATE_FOUND",
        title: "No Certificate Presented",
        category: FindingCategory::Ssl,
        severity: Severity::Warning,
        description: "The TLS connection succeeded but the server did not present a certificate, so its identity could not be checked.",
        remediation: "Install a certificate issued by a trusted authority for this hostname."
    },
    FindingDetail {
        code: "SSL_EXPIRED",
        title: "SSL Certificate Not Valid Now",
        category: FindingCategory::Ssl,
        severity: Severity::Critical,
        description: "The current date is outside the certificate's validity window. Browsers show blocking warnings for such certificates.",
        remediation: "Renew the certificate immediately and automate renewals (e.g., ACME / Let's Encrypt)."
    },
    FindingDetail {
        code: "SSL_EXPIRING_SOON",
        title: "SSL Certificate Expiring Soon",
        category: FindingCategory::Ssl,
        severity: Severity::Warning,
        description: "The certificate expires within 30 days.",
        remediation: "Renew the certificate before it expires, or verify that automated renewal is working."
    },

    // --- Certificate Transparency ---
    FindingDetail {
        code: "CT_LOOKUP_FAILED",
        title: "Certificate Transparency Lookup Failed",
        category: FindingCategory::CertificateTransparency,
        severity: Severity::Info,
        description: "The crt.sh search did not return usable data. The service is frequently overloaded, so this usually says nothing about the target.",
        remediation: "Retry later. No action is needed on the target itself."
    },
    FindingDetail {
        code: "CT_WILDCARD_CERTIFICATE",
        title: "Wildcard Certificates Issued",
        category: FindingCategory::CertificateTransparency,
        severity: Severity::Info,
        description: "Certificate transparency logs show wildcard certificates for this domain. A leaked wildcard key lets an attacker impersonate every subdomain.",
        remediation: "Limit wildcard certificates to the hosts that need them and protect their private keys carefully."
    },

    // --- Web Archive ---
    FindingDetail {
        code: "WAYBACK_LOOKUP_FAILED",
        title: "Wayback Machine Lookup Failed",
        category: FindingCategory::Archive,
        severity: Severity::Info,
        description: "The Wayback Machine CDX service could not be queried.",
        remediation: "Retry later. No action is needed on the target itself."
    },
    FindingDetail {
        code: "WAYBACK_NO_SNAPSHOTS",
        title: "No Archived Snapshots",
        category: FindingCategory::Archive,
        severity: Severity::Info,
        description: "The Wayback Machine has no captures of this site. The domain may be new, or it may block archiving.",
        remediation: "Nothing to fix. Historical content analysis is simply unavailable for this target."
    },
];

/// Looks up the full detail for a finding code.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        for (i, finding) in FINDINGS.iter().enumerate() {
            assert!(
                FINDINGS[i + 1..].iter().all(|other| other.code != finding.code),
                "duplicate code {}",
                finding.code
            );
        }
    }

    #[test]
    fn test_lookup() {
        let detail = get_finding_detail("SSL_EXPIRED").expect("code should exist");
        assert_eq!(detail.category, FindingCategory::Ssl);
        assert_eq!(detail.severity, Severity::Critical);
        assert!(get_finding_detail("NOPE").is_none());
    }

    #[test]
    fn test_recon_codes_resolve() {
        for code in [
            "GEO_DATABASE_UNAVAILABLE",
            "GEO_LOOKUP_FAILED",
            "GEO_MULTIPLE_COUNTRIES",
            "WHOIS_LOOKUP_FAILED",
            "WHOIS_NO_RECORD",
            "WHOIS_DOMAIN_EXPIRED",
            "WHOIS_DOMAIN_EXPIRING_SOON",
            "WHOIS_TRANSFER_UNLOCKED",
        ] {
            assert!(get_finding_detail(code).is_some(), "missing {code}");
        }
        assert_eq!(FindingCategory::Whois.to_string(), "WHOIS");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(FindingCategory::CertificateTransparency.to_string(), "Certificate Transparency");
    }
}
