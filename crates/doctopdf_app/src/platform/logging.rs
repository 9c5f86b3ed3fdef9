//! Logger setup for the doctopdf binary.
//!
//! Writes to `./doctopdf.log` in the working directory, optionally mirrored to
//! the terminal. The level comes from `DOCTOPDF_LOG` (default `info`).

use std::fs::File;
use std::path::{Path, PathBuf};

use doctopdf_logging::level_from_env;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_FILENAME: &str = "doctopdf.log";

pub enum LogDestination {
    File,
    Both,
}

impl LogDestination {
    pub fn from_flag(log_to_terminal: bool) -> Self {
        if log_to_terminal {
            LogDestination::Both
        } else {
            LogDestination::File
        }
    }
}

pub fn initialize(destination: LogDestination) {
    let level = level_from_env(LevelFilter::Info);
    let config = build_config();
    let log_path = PathBuf::from(".").join(LOG_FILENAME);

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Both) {
        // Stderr keeps log lines out of the rendered screen on stdout.
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if let Some(file_logger) = create_file_logger(&log_path, level, config) {
        loggers.push(file_logger);
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    log_path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
