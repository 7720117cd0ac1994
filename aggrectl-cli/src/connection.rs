//! Connection settings from flags, environment, .env and TOML files

use aggrectl_core::config::{AggreConfig, ConnectionConfig, DatabaseSettings};
use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

/// Database connection flags (each falls back to an environment variable)
#[derive(Args, Clone, Default)]
pub struct DbArgs {
    /// Database host [default: localhost]
    #[arg(long, env = "AGGRE_DB_HOST")]
    pub host: Option<String>,

    /// Database port [default: 5432]
    #[arg(long, env = "AGGRE_DB_PORT")]
    pub port: Option<u16>,

    /// Database name
    #[arg(long = "database", short = 'd', env = "AGGRE_DB_NAME")]
    pub database: Option<String>,

    /// Database user
    #[arg(long, short = 'U', env = "AGGRE_DB_USER")]
    pub user: Option<String>,

    /// Database password (prefer the environment variable over the flag)
    #[arg(long, env = "AGGRE_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl std::fmt::Debug for DbArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbArgs")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DbArgs {
    fn into_settings(self) -> DatabaseSettings {
        DatabaseSettings {
            host: self.host,
            port: self.port,
            name: self.database,
            user: self.user,
            password: self.password,
        }
    }

    /// Layer flags/env over config files and resolve a connection target
    pub fn resolve(self) -> Result<ConnectionConfig> {
        let files = AggreConfig::load().context("failed to load configuration")?;
        let config = files
            .database
            .overlay(self.into_settings())
            .resolve()
            .context("incomplete database configuration")?;
        debug!(?config, "resolved connection");
        Ok(config)
    }
}
