#![deny(missing_docs)]
//! Shared logging utilities for the doctopdf workspace.
//!
//! This crate provides the `dtp_*` logging macros used across the codebase,
//! level parsing for the `DOCTOPDF_LOG` environment variable and a minimal
//! test initializer for the global logger.

use log::LevelFilter;

/// Environment variable consulted by [`level_from_env`].
pub const LOG_LEVEL_ENV: &str = "DOCTOPDF_LOG";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! dtp_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! dtp_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! dtp_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! dtp_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! dtp_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Parses a level name such as `"debug"` or `"WARN"`.
///
/// Accepts `"warning"` as an alias for `warn`. Unknown or empty names yield `None`.
pub fn parse_level(raw: &str) -> Option<LevelFilter> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    raw.parse::<LevelFilter>().ok()
}

/// Reads [`LOG_LEVEL_ENV`], falling back to `default` when unset or invalid.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|raw| parse_level(&raw))
        .unwrap_or(default)
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let fallback = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level_from_env(fallback),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
