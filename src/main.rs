// src/main.rs

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

use vanguard_recon::config::ReconConfig;
use vanguard_recon::core::{models::ScanReport, scanner, target};
use vanguard_recon::{export, logging};

mod app;
mod ui;

use app::{App, AppState, ExportStatus};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let log_path = logging::initialize_logging()?;
    info!(log = %log_path.display(), "Vanguard Recon starting.");
    let config = ReconConfig::load()?;

    // --- Setup ---
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let result = run(&mut terminal, config).await;

    // --- Restore Terminal ---
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    info!("Vanguard Recon exiting.");
    result
}

async fn run<B: Backend>(terminal: &mut Terminal<B>, config: ReconConfig) -> Result<()> {
    let mut app = App::new();
    let (tx, mut rx) = mpsc::channel(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &tx, &config)?;
        }
        app.on_tick();

        if let Ok(report) = rx.try_recv() {
            app.finish_scan(report);
        }
    }
    Ok(())
}

fn handle_events(app: &mut App, tx: &mpsc::Sender<ScanReport>, config: &ReconConfig) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            match app.state {
                AppState::Idle => handle_idle_input(app, key.code, tx, config),
                AppState::Finished => handle_finished_input(app, key.code),
                AppState::Scanning => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                        app.quit();
                    }
                }
            }
        }
    }
    Ok(())
}

/// Handles typing in the target box.
fn handle_idle_input(app: &mut App, key_code: KeyCode, tx: &mpsc::Sender<ScanReport>, config: &ReconConfig) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => {
            app.input.push(c);
            app.input_error = None;
        }
        KeyCode::Backspace => {
            app.input.pop();
            app.input_error = None;
        }
        KeyCode::Enter => {
            if app.input.is_empty() {
                return;
            }
            let Some(target_domain) = target::normalize_target(&app.input) else {
                app.input_error = Some(format!("'{}' is not a valid domain", app.input.trim()));
                return;
            };

            info!(target = %target_domain, "Scan requested.");
            app.state = AppState::Scanning;
            let tx_clone = tx.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let report = scanner::run_full_scan(&target_domain, &config).await;
                if tx_clone.send(report).await.is_err() {
                    error!("Report receiver dropped before the scan finished.");
                }
            });
        }
        _ => {}
    }
}

/// Handles keys while the report is displayed.
fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('n') | KeyCode::Char('N') => app.reset(),
        KeyCode::Char('e') | KeyCode::Char('E') => export_current_report(app),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        _ => {}
    }
}

fn export_current_report(app: &mut App) {
    let Some(report) = &app.scan_report else {
        return;
    };
    app.export_status = match export::export_report(report, &export::default_export_dir()) {
        Ok(path) => ExportStatus::Success(path.display().to_string()),
        Err(e) => {
            error!(error = %e, "Report export failed.");
            ExportStatus::Error(e.to_string())
        }
    };
}
