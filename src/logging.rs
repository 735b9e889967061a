//! Logging configuration for Bible Reader
//!
//! Logs are written to both the terminal and a file at:
//! `<data_local_dir>/Bible Reader/logs/bible-reader.log`

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "bible-reader.log";
const LOG_FILE_OLD: &str = "bible-reader.log.old";

/// Logs larger than this are moved aside at startup
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("Bible Reader").join("logs"))
}

/// Get the current log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE))
}

/// Initialize the logging system
///
/// Sets up combined logging to the terminal (`terminal_level` and above) and
/// to the log file (debug and above).
///
/// Returns the path to the log file on success
pub fn init_logging(terminal_level: LevelFilter) -> Option<PathBuf> {
    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            init_terminal_only(terminal_level);
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(terminal_level);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);
    rotate_if_large(&log_path, &log_dir.join(LOG_FILE_OLD));

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(terminal_level);
            return None;
        }
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(terminal_level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config, log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== Bible Reader session started ===");
    log::debug!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Move an oversized log out of the way, keeping one old copy
fn rotate_if_large(log_path: &Path, backup_path: &Path) -> bool {
    match fs::metadata(log_path) {
        Ok(metadata) if metadata.len() > MAX_LOG_SIZE => fs::rename(log_path, backup_path).is_ok(),
        _ => false,
    }
}

/// Initialize terminal-only logging (fallback if file logging fails)
fn init_terminal_only(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let term_logger = TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto);
    let _ = CombinedLogger::init(vec![term_logger]);
}
