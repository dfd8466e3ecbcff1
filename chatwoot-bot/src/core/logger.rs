//! Tracing setup: console always, plus an optional log-file tee.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Initializes the global tracing subscriber.
///
/// Log level comes from `RUST_LOG` (default `info`); load `.env` via
/// `dotenvy::dotenv()` before calling this or `RUST_LOG` from the file is
/// not picked up. When `log_file` is set, the same output is appended there
/// as well as written to stdout.
pub fn init_tracing(log_file: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = Registry::default().with(env_filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let file = Arc::new(file);
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stdout.and(file))
                .with_target(true)
                .with_level(true);
            registry
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;
        }
        None => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_target(true)
                .with_level(true);
            registry
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;
        }
    }

    Ok(())
}
