//! Logging Infrastructure
//!
//! Structured logging setup for development (pretty stdout) and
//! production (JSON, daily rolling files).

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (info, stdout)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Default filter when `RUST_LOG` is not set
fn default_filter(level: &str) -> String {
    format!("floor_server={level},shared={level},security={level},tower_http={level}")
}

/// Initialize the logger with optional file output
///
/// - `RUST_LOG` 优先于 `log_level`
/// - `log_dir` 存在时写入按天滚动的 `floor-server.YYYY-MM-DD` 文件
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let file_appender = log_dir.and_then(|dir| {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => Some(tracing_appender::rolling::daily(log_path, "floor-server")),
            Err(e) => {
                eprintln!("Cannot create log dir {}: {}, logging to stdout", dir, e);
                None
            }
        }
    });

    let result = match (json, file_appender) {
        (true, Some(appender)) => subscriber.json().with_writer(appender).try_init(),
        (true, None) => subscriber.json().try_init(),
        (false, Some(appender)) => subscriber.with_ansi(false).with_writer(appender).try_init(),
        (false, None) => subscriber.try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logger already initialized: {}", e);
    }
}
