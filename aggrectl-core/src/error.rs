//! Structured error types for aggrectl-core.
//!
//! Uses `thiserror` so library consumers can match on the failure class.
//! The binary crate (aggrectl-cli) wraps these in `anyhow` for reporting.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while (re)initializing the schema.
///
/// Every variant means the run was abandoned as a whole: nothing from the
/// run is committed.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Could not reach the database or authenticate against it
    #[error("failed to connect to {target}: {source}")]
    Connection {
        /// Redacted connection target (`postgres://user@host:port/db`)
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// A DDL statement was rejected
    #[error("statement '{label}' failed: {source}")]
    Statement {
        label: String,
        #[source]
        source: sqlx::Error,
    },

    /// The transaction could not be committed
    #[error("failed to commit schema changes: {source}")]
    Commit {
        #[source]
        source: sqlx::Error,
    },
}

impl SchemaError {
    pub fn connection(target: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Connection {
            target: target.into(),
            source,
        }
    }

    pub fn statement(label: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Statement {
            label: label.into(),
            source,
        }
    }

    /// Short machine-friendly name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Statement { .. } => "statement",
            Self::Commit { .. } => "commit",
        }
    }

    /// True when the server rejected the credentials (SQLSTATE class 28)
    pub fn is_auth_failure(&self) -> bool {
        let Self::Connection { source, .. } = self else {
            return false;
        };
        match source {
            sqlx::Error::Database(db) => db
                .code()
                .map(|code| code.starts_with("28"))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Configuration could not be resolved into a usable connection target.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was not supplied by any source
    #[error("missing required setting '{field}' (set {env} or [database].{key} in aggrectl.toml)")]
    Missing {
        field: &'static str,
        env: &'static str,
        key: &'static str,
    },

    /// A setting was present but unusable
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Config file exists but could not be read
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected layout
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A reset plan could not be built from the requested tables.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("unknown table '{name}' (known tables: {known})")]
    UnknownTable { name: String, known: String },

    #[error("no tables selected")]
    Empty,
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
