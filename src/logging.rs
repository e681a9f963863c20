// src/logging.rs
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,lighter_engine=debug";
const LOG_FILE: &str = "lighter_engine.log";

/// `rolling::daily` panics if it cannot open its first file, so the directory
/// is created and test-written up front.
fn writable_dir(dir: &str) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let test_path = Path::new(dir).join(".lighter_engine_write_test");
    match OpenOptions::new().create(true).append(true).open(&test_path) {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);
            true
        }
        Err(_) => false,
    }
}

/// Console logging filtered by `RUST_LOG`, plus a daily-rolling file under
/// `LOG_DIR` when that variable is set and the directory is usable.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match std::env::var("LOG_DIR") {
        Ok(dir) if writable_dir(&dir) => {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Ok(dir) => {
            eprintln!("Log directory {} is not writable, logging to console only", dir);
            (None, None)
        }
        Err(_) => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init();

    guard
}
