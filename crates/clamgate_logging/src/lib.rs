//! Shared logging setup for clamgate binaries.
//!
//! The pipeline runs one invocation per process and the hosting environment
//! captures stderr, so all output goes to a single stderr fmt layer gated by
//! an `EnvFilter`.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "clamgate=info,clamgate_logging=info";

/// Logging configuration shared by clamgate binaries.
pub struct LogConfig {
    pub verbose: bool,
}

/// Initialize tracing with a stderr writer.
///
/// `RUST_LOG` overrides the default filter; `verbose` widens it to debug for
/// the clamgate crates when no override is present.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.verbose {
            EnvFilter::new("clamgate=debug,clamgate_logging=debug")
        } else {
            EnvFilter::new(DEFAULT_LOG_FILTER)
        }
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_filter(filter),
        )
        .init();

    Ok(())
}
