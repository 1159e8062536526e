// src/logging.rs
//! Tracing subscriber setup

use crate::error::{NavError, Result};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. When `directory` is set, a
/// daily-rolling log file is written there alongside console output.
pub fn init_logging(level: &str, directory: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let file_layer = match directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = rolling::daily(dir, "nav-monitor.log");
            Some(fmt::layer().with_writer(file_appender).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| NavError::Logging(e.to_string()))
}
