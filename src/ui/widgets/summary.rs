// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};
use vanguard_recon::core::models::{AnalysisFinding, ScanReport, Severity};

/// Renders the summary widget, which provides a high-level overview of the scan results.
///
/// This widget displays the overall score, a gauge, a pass/fail line per
/// scanner, the issue counts and the detected technologies. It only renders
/// content once the scan has finished.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering the UI.
/// * `app` - A reference to the application's state, containing all scan data.
/// * `area` - The `Rect` defining the drawable area for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & Rating section
            Constraint::Length(1), // Gauge chart
            Constraint::Length(1), // Spacer
            Constraint::Length(8), // Checks section
            Constraint::Length(1), // Spacer
            Constraint::Length(3), // Issues Found section
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Technologies section
        ])
        .split(area);

    let report = match (&app.state, &app.scan_report) {
        (AppState::Finished, Some(report)) => report,
        _ => return,
    };

    // --- Score & Rating Section ---
    let (rating_text, rating_style) = match app.summary.score {
        90..=100 => ("Excellent", Style::default().fg(Color::Green)),
        75..=89 => ("Good", Style::default().fg(Color::Cyan)),
        50..=74 => ("Needs Improvement", Style::default().fg(Color::Yellow)),
        _ => ("Poor", Style::default().fg(Color::Red)),
    };
    let score_line = Line::from(format!("{}/100 ({})", app.summary.score, rating_text)).style(rating_style);
    let score_text = Text::from(vec![Line::from("Overall Score".bold()), score_line]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    let score_gauge = Gauge::default()
        .percent(app.summary.score as u16)
        .label("")
        .style(Style::default().fg(
            if app.summary.score >= 80 { Color::Green }
            else if app.summary.score >= 50 { Color::Yellow }
            else { Color::Red }
        ));
    frame.render_widget(score_gauge, summary_chunks[1]);

    // --- Checks Section ---
    let checks_block = Block::default().title("CHECKS".bold());
    let checks_to_render = [
        ("Website Content", passed(&report.content_results.analysis)),
        ("DNS", passed(&report.dns_results.analysis)),
        ("Geolocation", passed(&report.geo_results.analysis)),
        ("WHOIS", passed(&report.whois_results.analysis)),
        ("SSL/TLS Certificate", passed(&report.ssl_results.analysis)),
        ("Certificate Transparency", passed(&report.ct_results.analysis)),
        ("Web Archive", passed(&report.wayback_results.analysis)),
    ];
    let checks_lines: Vec<Line> = checks_to_render
        .into_iter()
        .map(|(name, passed)| {
            let (icon, style) = if passed { ("✓", Style::default().fg(Color::Green)) } else { ("✗", Style::default().fg(Color::Red)) };
            Line::from(vec![Span::styled(format!("{} ", icon), style), Span::raw(name)])
        })
        .collect();
    frame.render_widget(Paragraph::new(checks_lines).block(checks_block), summary_chunks[3]);

    // --- Issue Details Section ---
    let issues_block = Block::default().title("ISSUES FOUND".bold());
    let details_text = Text::from(vec![
        Line::from(vec![Span::raw("Critical: "), Span::styled(app.summary.critical_issues.to_string(), Style::default().fg(Color::Red))]),
        Line::from(vec![Span::raw("Warnings: "), Span::styled(app.summary.warning_issues.to_string(), Style::default().fg(Color::Yellow))]),
    ]);
    frame.render_widget(Paragraph::new(details_text).block(issues_block), summary_chunks[5]);

    // --- Technologies Section ---
    let tech_block = Block::default().title("TECHNOLOGIES".bold());
    frame.render_widget(Paragraph::new(technology_lines(report)).block(tech_block), summary_chunks[7]);
}

// A scanner passes when it raised nothing above Info.
fn passed(analysis: &[AnalysisFinding]) -> bool {
    analysis.iter().all(|f| f.severity == Severity::Info)
}

fn technology_lines(report: &ScanReport) -> Vec<Line<'_>> {
    match &report.content_results.page {
        Ok(Some(page)) if !page.technologies().is_empty() => page
            .technologies()
            .iter()
            .map(|tech| {
                Line::from(vec![
                    Span::raw("- "),
                    Span::styled(tech.as_str(), Style::default().fg(Color::Cyan)),
                ])
            })
            .collect(),
        Ok(_) => vec![Line::from("Not identified.")],
        Err(e) => vec![Line::from(Span::styled(
            format!("Scan failed: {}", e),
            Style::default().fg(Color::Red),
        ))],
    }
}
