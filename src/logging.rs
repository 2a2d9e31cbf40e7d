use flexi_logger::{DeferredNow, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Record};
use std::path::{Path, PathBuf};

/// Log files land in `<cache dir>/snow-globe/logs`, or `./logs` without one
pub fn default_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("snow-globe").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Start file logging. The terminal belongs to the UI, so nothing goes to stdout.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Keep the returned
/// handle alive for as long as the program should log.
pub fn setup(dir: &Path) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str("info")?
        .log_to_file(FileSpec::default().directory(dir).basename("snow-globe"))
        .format(line_format)
        .start()
}

/// `12:00:01.250 INFO [src/globe.rs:57] message`
pub fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} [{}:{}] {}",
        now.now().format("%H:%M:%S%.3f"),
        record.level(),
        record.file().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
        record.args()
    )
}
