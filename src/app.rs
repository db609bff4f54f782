// src/app.rs

use ratatui::widgets::ScrollbarState;
use vanguard_recon::core::models::{ScanReport, Severity};

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub score: u8,
    pub critical_issues: usize,
    pub warning_issues: usize,
}

impl ScanSummary {
    /// 100, minus 15 per critical finding and 5 per warning, floored at zero.
    pub fn from_report(report: &ScanReport) -> Self {
        let criticals = report.all_findings().filter(|f| f.severity == Severity::Critical).count();
        let warnings = report.all_findings().filter(|f| f.severity == Severity::Warning).count();
        let penalty = criticals.saturating_mul(15).saturating_add(warnings.saturating_mul(5));

        Self {
            score: 100usize.saturating_sub(penalty) as u8,
            critical_issues: criticals,
            warning_issues: warnings,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    /// Shown under the input box when the typed target is rejected.
    pub input_error: Option<String>,
    pub scan_report: Option<ScanReport>,
    pub summary: ScanSummary,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
    pub spinner_frame: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            input_error: None,
            scan_report: None,
            summary: ScanSummary::default(),
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
            spinner_frame: 0,
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn finish_scan(&mut self, report: ScanReport) {
        self.summary = ScanSummary::from_report(&report);
        self.scan_report = Some(report);
        self.state = AppState::Finished;
    }

    pub fn on_tick(&mut self) {
        if let AppState::Scanning = self.state {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.input_error = None;
        self.scan_report = None;
        self.summary = ScanSummary::default();
        self.scroll_offset = 0;
        self.report_scroll_state = ScrollbarState::default();
        self.export_status = ExportStatus::Idle;
        self.spinner_frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_recon::core::models::{AnalysisFinding, DnsResults, SslResults};

    fn report_with(ssl: Vec<AnalysisFinding>, dns: Vec<AnalysisFinding>) -> ScanReport {
        ScanReport {
            ssl_results: SslResults { scan: Ok(None), analysis: ssl },
            dns_results: DnsResults { analysis: dns, ..DnsResults::default() },
            ..ScanReport::default()
        }
    }

    #[test]
    fn test_summary_score() {
        let report = report_with(
            vec![
                AnalysisFinding::new(Severity::Critical, "SSL_EXPIRED"),
                AnalysisFinding::new(Severity::Warning, "SSL_EXPIRING_SOON"),
            ],
            vec![AnalysisFinding::new(Severity::Info, "DNS_MX_MISSING")],
        );
        assert_eq!(
            ScanSummary::from_report(&report),
            ScanSummary { score: 80, critical_issues: 1, warning_issues: 1 }
        );
    }

    #[test]
    fn test_summary_score_floors_at_zero() {
        let criticals = (0..8).map(|_| AnalysisFinding::new(Severity::Critical, "SSL_EXPIRED")).collect();
        assert_eq!(ScanSummary::from_report(&report_with(criticals, Vec::new())).score, 0);
    }

    #[test]
    fn test_spinner_only_moves_while_scanning() {
        let mut app = App::new();
        app.on_tick();
        assert_eq!(app.spinner_frame, 0);

        app.state = AppState::Scanning;
        for _ in 0..SPINNER_CHARS.len() + 1 {
            app.on_tick();
        }
        assert_eq!(app.spinner_frame, 1);

        app.finish_scan(ScanReport::default());
        assert!(matches!(app.state, AppState::Finished));
        app.reset();
        assert!(app.scan_report.is_none());
    }
}
