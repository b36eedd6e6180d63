//! File logging for the TUI.
//!
//! The terminal is owned by the UI, so logs go to a size-rotated file under
//! the platform data directory. Initialisation happens at most once per
//! process; later calls are no-ops.

use std::path::Path;
use std::sync::OnceLock;

use color_eyre::eyre::{WrapErr, eyre};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "ember";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Start file logging at `level` in `dir`.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: &str, dir: &Path) -> color_eyre::Result<()> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let level = normalize_level(level)?;

    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("failed to create log directory {}", dir.display()))?;

    let handle = Logger::try_with_env_or_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    if LOGGER.set(handle).is_ok() {
        info!(
            "ember {} started, level={level} dir={}",
            env!("CARGO_PKG_VERSION"),
            dir.display()
        );
    }
    Ok(())
}

/// Flush buffered records. The handle lives in a static and is never dropped.
pub fn flush() {
    if let Some(handle) = LOGGER.get() {
        handle.flush();
    }
}

fn normalize_level(level: &str) -> color_eyre::Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(eyre!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}
