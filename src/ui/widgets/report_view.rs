// src/ui/widgets/report_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Wrap},
};
use vanguard_recon::core::knowledge_base;
use vanguard_recon::core::models::{AnalysisFinding, ScanReport, ScanResult, Severity};

/// Renders the report area: a placeholder while idle, a spinner while scanning,
/// and the full scrollable report once the scan is done.
pub fn render_report_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default()
        .borders(Borders::ALL)
        .title("Report (Navigate with ↑ ↓)");

    let report = match (&app.state, &app.scan_report) {
        (AppState::Finished, Some(report)) => report,
        (AppState::Scanning, _) => {
            let spinner_char = SPINNER_CHARS[app.spinner_frame];
            let content = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                Span::raw("Scanning... Please wait."),
            ]))
            .alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
        _ => {
            let content = Paragraph::new("Scan results will appear here...").alignment(Alignment::Center);
            frame.render_widget(content.block(main_block), area);
            return;
        }
    };

    let lines = build_report_lines(report);
    let inner = main_block.inner(area);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner.width);

    // Keep the offset inside the wrapped document so ↓ stops once the last row is visible.
    app.scroll_offset = app.scroll_offset.min(max_scroll(rows, inner.height));
    app.report_scroll_state = app
        .report_scroll_state
        .content_length(rows)
        .position(app.scroll_offset);

    let paragraph = paragraph
        .block(main_block)
        .scroll((scroll_rows(app.scroll_offset), 0));
    frame.render_widget(paragraph, area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin { vertical: 1, horizontal: 0 }),
        &mut app.report_scroll_state,
    );
}

fn max_scroll(rows: usize, viewport: u16) -> usize {
    rows.saturating_sub(usize::from(viewport))
}

fn scroll_rows(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Flattens the whole report into styled lines, one section after another.
fn build_report_lines(report: &ScanReport) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(report.target.clone(), Style::default().bold()),
        Span::styled(
            format!("  scanned {}", report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    content_section(&mut lines, report);
    dns_section(&mut lines, report);
    geo_section(&mut lines, report);
    whois_section(&mut lines, report);
    ssl_section(&mut lines, report);
    ct_section(&mut lines, report);
    wayback_section(&mut lines, report);
    findings_section(&mut lines, report);

    lines
}

fn heading(lines: &mut Vec<Line<'static>>, title: &str) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        title.to_uppercase(),
        Style::default().fg(Color::Yellow).bold(),
    )));
}

fn field(lines: &mut Vec<Line<'static>>, label: &str, value: impl Into<String>) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {}: ", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value.into()),
    ]));
}

fn list(lines: &mut Vec<Line<'static>>, label: &str, items: &[String]) {
    field(lines, label, items.len().to_string());
    for item in items {
        lines.push(Line::from(format!("    - {}", item)));
    }
}

fn failure(lines: &mut Vec<Line<'static>>, message: &str) {
    lines.push(Line::from(Span::styled(
        format!("  Lookup failed: {}", message),
        Style::default().fg(Color::Red),
    )));
}

// Renders `Ok(None)` and `Err` uniformly; returns the value only when there is one.
fn present<'a, T>(lines: &mut Vec<Line<'static>>, result: &'a ScanResult<T>, empty: &str) -> Option<&'a T> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            lines.push(Line::from(format!("  {}", empty)));
            None
        }
        Err(e) => {
            failure(lines, e);
            None
        }
    }
}

fn content_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "Website Content");
    let results = &report.content_results;
    field(lines, "URL", results.url.clone());

    let Some(page) = present(lines, &results.page, "No content retrieved.") else {
        return;
    };

    field(lines, "Title", if page.title().is_empty() { "(none)" } else { page.title() });
    field(
        lines,
        "Links",
        format!(
            "{} total, {} internal, {} external",
            page.links().len(),
            page.internal_links().len(),
            page.external_links().len()
        ),
    );
    list(lines, "Emails", page.emails());
    list(lines, "Phone numbers", page.phone_numbers());

    field(lines, "Social media", page.social_media().len().to_string());
    for (platform, urls) in page.social_media() {
        lines.push(Line::from(format!("    {}:", platform)));
        for url in urls {
            lines.push(Line::from(format!("      - {}", url)));
        }
    }

    list(lines, "Technologies", page.technologies());
    list(lines, "Forms", page.forms());
    list(lines, "Scripts", page.scripts());
    list(lines, "Stylesheets", page.stylesheets());
    list(lines, "Comments", page.comments());

    field(lines, "Meta tags", page.meta_tags().len().to_string());
    for (name, content) in page.meta_tags() {
        lines.push(Line::from(format!("    {} = {}", name, content)));
    }
}

fn dns_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "DNS");
    let results = &report.dns_results;

    if let Some(addresses) = present(lines, &results.addresses, "No A/AAAA records.") {
        list(lines, "Addresses", addresses);
    }
    for record in &results.reverse {
        match &record.names {
            Ok(Some(names)) => field(lines, &format!("PTR {}", record.ip), names.join(", ")),
            Ok(None) => field(lines, &format!("PTR {}", record.ip), "(none)"),
            Err(e) => field(lines, &format!("PTR {}", record.ip), format!("failed: {}", e)),
        }
    }
    if let Some(mx) = present(lines, &results.mx, "No MX records.") {
        let exchanges: Vec<String> = mx.iter().map(|r| format!("{} {}", r.preference, r.exchange)).collect();
        list(lines, "MX", &exchanges);
    }
}

fn geo_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "Geolocation");
    let results = &report.geo_results;
    let Some(database) = &results.database else {
        lines.push(Line::from("  No GeoLite database configured."));
        return;
    };
    field(lines, "Database", database.clone());

    let Some(locations) = present(lines, &results.locations, "No address found in the database.") else {
        return;
    };
    for location in locations {
        let place: Vec<&str> = [&location.city, &location.region, &location.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        let mut value = if place.is_empty() { "(unknown)".to_string() } else { place.join(", ") };
        if let Some(code) = &location.country_code {
            value.push_str(&format!(" [{}]", code));
        }
        if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
            value.push_str(&format!(" ({:.4}, {:.4})", lat, lon));
        }
        if let Some(timezone) = &location.timezone {
            value.push_str(&format!(" {}", timezone));
        }
        field(lines, &location.ip, value);
    }
}

fn whois_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "WHOIS");
    let Some(record) = present(lines, &report.whois_results.record, "No registration record.") else {
        return;
    };
    let date = |value: &Option<chrono::DateTime<chrono::Utc>>| match value {
        Some(value) => value.format("%Y-%m-%d").to_string(),
        None => "(unknown)".to_string(),
    };

    field(lines, "Server", record.server.clone());
    field(lines, "Registrar", record.registrar.clone().unwrap_or_else(|| "(unknown)".to_string()));
    if let Some(registrant) = &record.registrant {
        field(lines, "Registrant", registrant.clone());
    }
    field(lines, "Created", date(&record.created));
    field(lines, "Updated", date(&record.updated));
    field(lines, "Expires", date(&record.expires));
    list(lines, "Status", &record.status);
    list(lines, "Name servers", &record.name_servers);
}

fn ssl_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "SSL/TLS Certificate");
    let Some(data) = present(lines, &report.ssl_results.scan, "No certificate presented.") else {
        return;
    };
    let cert = &data.certificate_info;
    let validity = if data.is_valid {
        Span::styled("valid", Style::default().fg(Color::Green))
    } else {
        Span::styled("NOT valid", Style::default().fg(Color::Red))
    };
    lines.push(Line::from(vec![
        Span::styled("  Status: ", Style::default().fg(Color::DarkGray)),
        validity,
        Span::raw(format!(" ({} days left)", cert.days_until_expiry)),
    ]));
    field(lines, "Subject", cert.subject_name.clone());
    field(lines, "Issuer", cert.issuer_name.clone());
    field(lines, "Serial", cert.serial.clone());
    field(lines, "Valid from", cert.not_before.format("%Y-%m-%d").to_string());
    field(lines, "Valid until", cert.not_after.format("%Y-%m-%d").to_string());
    list(lines, "Names", &cert.dns_names);
}

fn ct_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "Certificate Transparency");
    let results = &report.ct_results;
    if let Some(entries) = present(lines, &results.entries, "No logged certificates.") {
        field(lines, "Logged certificates", entries.len().to_string());
        list(lines, "Names seen", &results.names);
    }

    for certificate in &results.certificates {
        lines.push(Line::from(format!("  Certificate #{}", certificate.id)));
        match &certificate.details {
            Ok(Some(cert)) => {
                field(lines, "  Subject", cert.subject_name.clone());
                field(lines, "  Issuer", cert.issuer_name.clone());
                field(
                    lines,
                    "  Valid",
                    format!("{} to {}", cert.not_before.format("%Y-%m-%d"), cert.not_after.format("%Y-%m-%d")),
                );
                field(lines, "  Names", cert.dns_names.join(", "));
            }
            Ok(None) => lines.push(Line::from("    (empty download)")),
            Err(e) => failure(lines, e),
        }
    }
}

fn wayback_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "Web Archive");
    if let Some(snapshots) = present(lines, &report.wayback_results.snapshots, "No archived snapshots.") {
        let rows: Vec<String> = snapshots
            .iter()
            .map(|s| format!("{} [{}] {}", s.timestamp, s.status, s.archive_url))
            .collect();
        list(lines, "Snapshots", &rows);
    }
}

fn findings_section(lines: &mut Vec<Line<'static>>, report: &ScanReport) {
    heading(lines, "Findings");
    let findings: Vec<&AnalysisFinding> = report.all_findings().collect();
    if findings.is_empty() {
        lines.push(Line::from(Span::styled("  ✓ No issues found.", Style::default().fg(Color::Green))));
        return;
    }

    for finding in findings {
        let style = match finding.severity {
            Severity::Critical => Style::default().fg(Color::Red).bold(),
            Severity::Warning => Style::default().fg(Color::Yellow),
            Severity::Info => Style::default().fg(Color::Cyan),
        };
        match knowledge_base::get_finding_detail(&finding.code) {
            Some(detail) => {
                lines.push(Line::from(vec![
                    Span::styled(format!("  [{:?}] ", finding.severity), style),
                    Span::styled(format!("[{}] ", detail.category), Style::default().fg(Color::DarkGray)),
                    Span::styled(detail.title, style),
                ]));
                lines.push(Line::from(format!("    {}", detail.description)));
                lines.push(Line::from(Span::styled(
                    format!("    Fix: {}", detail.remediation),
                    Style::default().fg(Color::Green),
                )));
            }
            None => lines.push(Line::from(vec![
                Span::styled(format!("  [{:?}] ", finding.severity), style),
                Span::raw(finding.code.clone()),
            ])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vanguard_recon::core::models::{
        CertificateInfo, ContentResults, CtCertificate, CtResults, GeoLocation, GeoResults, SslResults, WhoisRecord,
        WhoisResults,
    };
    use vanguard_recon::core::parser;

    fn plain(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_scroll_reaches_last_wrapped_row() {
        let long = "word ".repeat(40);
        let paragraph = Paragraph::new(vec![Line::from(long), Line::from("tail")]).wrap(Wrap { trim: false });
        let rows = paragraph.line_count(20);

        assert!(rows > 2, "wrapping should add rows, got {rows}");
        assert_eq!(max_scroll(rows, 5), rows - 5);
        assert_eq!(max_scroll(3, 10), 0);
    }

    #[test]
    fn test_scroll_offset_saturates() {
        assert_eq!(scroll_rows(12), 12);
        assert_eq!(scroll_rows(70_000), u16::MAX);
    }

    #[test]
    fn test_report_renders_every_section() {
        let page = parser::analyze(r#"<title>Shop</title><a href="mailto:sales@example.com">mail</a>"#).unwrap();
        let report = ScanReport {
            target: "example.com".to_string(),
            content_results: ContentResults {
                url: "https://example.com".to_string(),
                page: Ok(Some(page)),
                analysis: Vec::new(),
            },
            ssl_results: SslResults {
                scan: Err("TLS Handshake Error".to_string()),
                analysis: vec![AnalysisFinding::new(Severity::Critical, "SSL_HANDSHAKE_FAILED")],
            },
            ..ScanReport::default()
        };

        let text = plain(&build_report_lines(&report));
        for heading in [
            "WEBSITE CONTENT",
            "DNS",
            "GEOLOCATION",
            "WHOIS",
            "SSL/TLS CERTIFICATE",
            "CERTIFICATE TRANSPARENCY",
            "WEB ARCHIVE",
            "FINDINGS",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Title: Shop"));
        assert!(text.contains("- sales@example.com"));
        assert!(text.contains("Lookup failed: TLS Handshake Error"));
        assert!(text.contains("[Critical]"));
    }

    #[test]
    fn test_recon_sections() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let report = ScanReport {
            target: "example.com".to_string(),
            geo_results: GeoResults {
                database: Some("GeoLite2-City.mmdb".to_string()),
                locations: Ok(Some(vec![GeoLocation {
                    ip: "81.2.69.142".to_string(),
                    country_code: Some("GB".to_string()),
                    country: Some("United Kingdom".to_string()),
                    city: Some("London".to_string()),
                    latitude: Some(51.5142),
                    longitude: Some(-0.0931),
                    ..GeoLocation::default()
                }])),
                analysis: Vec::new(),
            },
            whois_results: WhoisResults {
                record: Ok(Some(WhoisRecord {
                    registrar: Some("Example Registrar, Inc.".to_string()),
                    expires: Some(issued),
                    name_servers: vec!["a.iana-servers.net".to_string()],
                    server: "whois.verisign-grs.com".to_string(),
                    ..WhoisRecord::default()
                })),
                analysis: Vec::new(),
            },
            ct_results: CtResults {
                certificates: vec![
                    CtCertificate {
                        id: 1234,
                        details: Ok(Some(CertificateInfo {
                            subject_name: "CN=example.com".to_string(),
                            issuer_name: "CN=R3".to_string(),
                            serial: "01".to_string(),
                            not_before: issued,
                            not_after: issued + chrono::Duration::days(90),
                            days_until_expiry: 90,
                            dns_names: vec!["example.com".to_string(), "www.example.com".to_string()],
                        })),
                    },
                    CtCertificate { id: 5678, details: Err("status code 429".to_string()) },
                ],
                ..CtResults::default()
            },
            ..ScanReport::default()
        };

        let text = plain(&build_report_lines(&report));
        assert!(text.contains("81.2.69.142: London, United Kingdom [GB] (51.5142, -0.0931)"));
        assert!(text.contains("Registrar: Example Registrar, Inc."));
        assert!(text.contains("Expires: 2025-01-01"));
        assert!(text.contains("- a.iana-servers.net"));
        assert!(text.contains("Certificate #1234"));
        assert!(text.contains("Valid: 2025-01-01 to 2025-04-01"));
        assert!(text.contains("Names: example.com, www.example.com"));
        assert!(text.contains("Lookup failed: status code 429"));
    }

    #[test]
    fn test_geolocation_without_database() {
        let text = plain(&build_report_lines(&ScanReport::default()));
        assert!(text.contains("No GeoLite database configured."));
        assert!(text.contains("No registration record."));
    }
}
