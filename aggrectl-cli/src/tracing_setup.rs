//! Tracing setup for aggrectl CLI
//!
//! Usage:
//!   aggrectl init                     # info-level progress on stderr
//!   aggrectl --quiet init             # warnings and errors only
//!   RUST_LOG=aggrectl_core=debug ...  # fine-grained control, shows SQL
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (overrides --quiet)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Only log warnings and errors unless RUST_LOG says otherwise
    pub quiet: bool,
}

pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let default_level = if config.quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
