//! Connection configuration
//!
//! `.env` loading, the `~/.aggrectl/config.toml` < `./aggrectl.toml` layers,
//! and the resolved [`ConnectionConfig`] the initializer connects with.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = "aggrectl.toml";

/// Which `.env` files were read by [`load_dotenv`]
///
/// Loading happens before logging is configured, so the outcome is kept
/// here and logged by the caller once a subscriber is installed.
#[derive(Debug, Default)]
pub struct DotenvFiles {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl DotenvFiles {
    fn load(&mut self, path: &Path) {
        match dotenvy::from_path(path) {
            Ok(()) => self.loaded.push(path.to_path_buf()),
            Err(e) => self.failed.push((path.to_path_buf(), e.to_string())),
        }
    }

    pub fn log(&self) {
        for path in &self.loaded {
            debug!("Loaded .env from {}", path.display());
        }
        for (path, reason) in &self.failed {
            debug!("Failed to load {}: {}", path.display(), reason);
        }
        if self.loaded.is_empty() && self.failed.is_empty() {
            debug!("No .env files found (current dir or ~/.aggrectl)");
        }
    }
}

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.aggrectl/.env
///
/// dotenvy never overwrites a variable that is already set, so loading the
/// closer file first gives it precedence.
pub fn load_dotenv() -> DotenvFiles {
    let mut files = DotenvFiles::default();

    if let Ok(path) = dotenvy::dotenv() {
        files.loaded.push(path);
    }

    if let Some(env_file) = config_dir().map(|d| d.join(".env")) {
        if env_file.exists() {
            files.load(&env_file);
        }
    }

    files
}

/// Get the aggrectl config directory path (~/.aggrectl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aggrectl"))
}

/// Everything needed to open one connection to the target database.
///
/// The password never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host",
                reason: "host is empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                field: "port",
                reason: "port must be between 1 and 65535".to_string(),
            });
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "database name",
                env: "AGGRE_DB_NAME",
                key: "name",
            });
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "user",
                env: "AGGRE_DB_USER",
                key: "user",
            });
        }
        Ok(())
    }

    /// Driver options for this target
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .application_name("aggrectl");

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    /// `postgres://user@host:port/database`, without the password
    pub fn redacted(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// TOML Configuration
// ============================================================================

/// Contents of `aggrectl.toml` / `~/.aggrectl/config.toml`
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct AggreConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// Partially specified connection settings from one source.
///
/// Sources are layered with [`DatabaseSettings::overlay`] and turned into a
/// [`ConnectionConfig`] with [`DatabaseSettings::resolve`].
#[derive(Clone, Deserialize, Default, PartialEq, Eq)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DatabaseSettings {
    /// Layer `overlay` on top of `self`; values set in `overlay` win
    pub fn overlay(self, overlay: DatabaseSettings) -> Self {
        Self {
            host: overlay.host.or(self.host),
            port: overlay.port.or(self.port),
            name: overlay.name.or(self.name),
            user: overlay.user.or(self.user),
            password: overlay.password.or(self.password),
        }
    }

    /// Fill defaults and validate
    pub fn resolve(self) -> Result<ConnectionConfig, ConfigError> {
        let database = non_blank(self.name).ok_or(ConfigError::Missing {
            field: "database name",
            env: "AGGRE_DB_NAME",
            key: "name",
        })?;
        let username = non_blank(self.user).ok_or(ConfigError::Missing {
            field: "user",
            env: "AGGRE_DB_USER",
            key: "user",
        })?;

        let config = ConnectionConfig {
            host: non_blank(self.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            database,
            username,
            password: self.password,
        };
        config.validate()?;
        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AggreConfig {
    /// Load config from TOML files
    ///
    /// Priority order (highest to lowest):
    /// 1. ./aggrectl.toml (project-specific)
    /// 2. ~/.aggrectl/config.toml (user defaults)
    /// 3. Built-in defaults
    ///
    /// Missing files are skipped; unreadable or malformed files are errors.
    pub fn load() -> Result<Self, ConfigError> {
        let global = config_dir().map(|d| d.join("config.toml"));
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        Self::load_layers(global.as_deref(), Some(local.as_path()))
    }

    /// Load `global` then overlay `local`, skipping files that do not exist
    pub fn load_layers(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = AggreConfig::default();

        for path in [global, local].into_iter().flatten() {
            if let Some(layer) = Self::load_file(path)? {
                config = config.merge(layer);
            }
        }

        Ok(config)
    }

    /// Read one config file, `Ok(None)` if it does not exist
    pub fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<AggreConfig>(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!("Loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Merge two configs (right overrides left)
    fn merge(self, overlay: Self) -> Self {
        Self {
            database: self.database.overlay(overlay.database),
        }
    }
}
