//! Logging setup and configuration

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::Config;

pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

pub fn setup_logging(log_dir: impl AsRef<Path>) -> Result<Arc<LoggingGuard>> {
    let file_appender = tracing_appender::rolling::daily(log_dir, "crypto-analyzer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_level(true)
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(false)
                .compact()
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?)
        )
        .init();

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}

pub fn setup_output_directories(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.log_dir)?;
    fs::create_dir_all(&config.report_dir)?;
    if let Some(parent) = Path::new(&config.store_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}
