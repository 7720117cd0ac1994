//! Schema initializer
//!
//! Runs a [`ResetPlan`] inside a single transaction:
//! connect → begin → execute each statement → commit.
//! The first failure rolls the transaction back, so a run either applies
//! every statement or none of them. The connection is closed on every exit
//! path when the initializer opened it.

use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{Result, SchemaError};
use crate::plan::ResetPlan;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub statements_applied: usize,
    /// Tables (re)created, staging table last
    pub tables: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaInitializer {
    plan: ResetPlan,
}

impl SchemaInitializer {
    pub fn new(plan: ResetPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &ResetPlan {
        &self.plan
    }

    /// Connect using `config`, apply the plan, close the connection
    pub async fn initialize(&self, config: &ConnectionConfig) -> Result<InitReport> {
        self.connect_and_apply(config.connect_options(), config.redacted())
            .await
    }

    /// Same as [`Self::initialize`] with caller-built driver options
    pub async fn initialize_with(&self, options: PgConnectOptions) -> Result<InitReport> {
        let target = format!(
            "postgres://{}@{}:{}/{}",
            options.get_username(),
            options.get_host(),
            options.get_port(),
            options.get_database().unwrap_or_default()
        );
        self.connect_and_apply(options, target).await
    }

    async fn connect_and_apply(
        &self,
        options: PgConnectOptions,
        target: String,
    ) -> Result<InitReport> {
        let mut conn = connect(&options, &target).await?;

        let result = self.apply(&mut conn).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close connection to {}: {}", target, e);
        }

        result
    }

    /// Apply the plan over an already established connection.
    ///
    /// The caller keeps ownership of the connection. Session-scoped tables
    /// created here live until that connection closes.
    pub async fn apply(&self, conn: &mut PgConnection) -> Result<InitReport> {
        let statements = self.plan.statements();

        let mut tx = conn
            .begin()
            .await
            .map_err(|source| SchemaError::statement("begin transaction", source))?;

        for statement in &statements {
            debug!(sql = %statement.sql, "executing {}", statement.label);

            if let Err(source) = sqlx::query(&statement.sql).execute(&mut *tx).await {
                if let Err(e) = tx.rollback().await {
                    warn!("Rollback after failed '{}' also failed: {}", statement.label, e);
                }
                return Err(SchemaError::statement(statement.label.clone(), source));
            }

            info!("✓ {}", statement.label);
        }

        tx.commit()
            .await
            .map_err(|source| SchemaError::Commit { source })?;

        let report = InitReport {
            statements_applied: statements.len(),
            tables: self.plan.table_names(),
        };
        info!(
            "Schema reset complete: {} statements, tables: {}",
            report.statements_applied,
            report.tables.join(", ")
        );
        Ok(report)
    }
}

/// Open a single connection, reporting failures as [`SchemaError::Connection`]
pub async fn connect(options: &PgConnectOptions, target: &str) -> Result<PgConnection> {
    info!("Connecting to {}", target);
    PgConnection::connect_with(options)
        .await
        .map_err(|source| SchemaError::connection(target, source))
}
