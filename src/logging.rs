// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.as_str());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Platform directories for config, data and logs.
pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vanguard-rs", env!("CARGO_PKG_NAME"))
}

/// Where the log file and exported reports live. Falls back to `./.data`.
pub fn get_data_dir() -> PathBuf {
    match project_directory() {
        Some(proj_dirs) => proj_dirs.data_local_dir().to_path_buf(),
        None => PathBuf::from(".").join(".data"),
    }
}

/// Picks the filter directive: `RUST_LOG` wins over `VANGUARD_RECON_LOGLEVEL`,
/// and without either the crate logs at `info`.
fn log_filter(rust_log: Option<String>, project_level: Option<String>) -> String {
    let set = |directive: &String| !directive.trim().is_empty();
    rust_log
        .filter(set)
        .or(project_level.filter(set))
        .unwrap_or_else(|| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// Initializes file-based logging using the tracing subscriber.
///
/// The terminal belongs to the TUI, so nothing is ever written to stdout.
/// Returns the path of the log file.
pub fn initialize_logging() -> Result<PathBuf> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = std::fs::File::create(&log_path)?;

    let file_log_level = log_filter(
        std::env::var("RUST_LOG").ok(),
        std::env::var(LOG_ENV.as_str()).ok(),
    );

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_timer(timer)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(file_log_level));

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(log_filter(Some("debug".into()), Some("warn".into())), "debug");
        assert_eq!(log_filter(None, Some("warn".into())), "warn");
        assert_eq!(log_filter(None, None), "vanguard_recon=info");
        assert_eq!(log_filter(Some("  ".into()), None), "vanguard_recon=info");
        assert_eq!(log_filter(Some("".into()), Some("trace".into())), "trace");
        assert_eq!(log_filter(None, Some(" ".into())), "vanguard_recon=info");
    }

    #[test]
    fn test_names() {
        assert_eq!(LOG_ENV.as_str(), "VANGUARD_RECON_LOGLEVEL");
        assert_eq!(LOG_FILE.as_str(), "vanguard-recon.log");
    }
}
