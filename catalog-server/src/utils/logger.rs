//! Logging Infrastructure
//!
//! Structured logging setup for development (stdout) and production
//! (optional daily rolling file).

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
fn default_filter(level: &str) -> String {
    format!("catalog_server={level},tower_http=info,sqlx=warn")
}

/// Initialize the logger with optional JSON output and file output
///
/// The returned guard must be held for the process lifetime when a file
/// writer is used; dropping it flushes and stops the background writer.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: Option<bool>,
    log_dir: Option<&str>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let level = log_level.unwrap_or("info");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "catalog-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let builder = builder.with_writer(writer).with_ansi(false);
            if json.unwrap_or(false) {
                builder.json().init();
            } else {
                builder.init();
            }
            return Some(guard);
        }
        eprintln!("log directory {dir} does not exist, logging to stdout");
    }

    if json.unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
    None
}
