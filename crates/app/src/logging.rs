//! Process-wide logger for the `tracker` binary.
//!
//! Library crates only emit through the `log` facade; this is the single place
//! a backend is installed.

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};
use log::info;

pub const DEFAULT_LOG_SPEC: &str = "info";

/// Start logging to stderr with the given spec (`info`, `debug,storage=trace`, ...).
///
/// The returned handle must be kept alive for the lifetime of the process.
///
/// # Errors
///
/// Returns `FlexiLoggerError` if the spec does not parse or the backend fails to start.
pub fn init_logging(spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    let spec = if spec.trim().is_empty() {
        DEFAULT_LOG_SPEC
    } else {
        spec.trim()
    };
    let handle = Logger::try_with_str(spec)?
        .log_to_stderr()
        .format_for_stderr(flexi_logger::detailed_format)
        .start()?;

    info!(
        "event=app_start module=app status=ok platform={} version={} level={spec}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}
