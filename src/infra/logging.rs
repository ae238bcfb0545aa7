//! For setting up logging.

use super::config::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Used when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug,items_api=debug";

/// Flushes logs upon being dropped.
#[derive(Debug)]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initializes logging.
pub fn init_logging(config: &LoggingConfig) -> LogGuard {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_DIRECTIVES.into());

    let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let stdout = tracing_subscriber::fmt::layer().with_writer(non_blocking_stdout);
    let stdout = match config.format {
        LogFormat::Pretty => stdout.boxed(),
        LogFormat::Json => stdout.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(stdout.with_filter(EnvFilter::new(log_level)))
        .with(ErrorLayer::default())
        .init();

    LogGuard {
        _guards: vec![stdout_guard],
    }
}
