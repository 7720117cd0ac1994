//! Verify command - compare the live schema with the table catalog

use aggrectl_core::catalog::{PERSISTENT_TABLES, TEMP_NEWS};
use aggrectl_core::{connect, inspect, ResetPlan, TableDef};
use anyhow::{bail, Result};
use clap::Parser;
use sqlx::Connection;
use tracing::warn;

use crate::connection::DbArgs;

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Only check this table (repeatable or comma-separated; default: all)
    #[arg(long = "table", short = 't', value_name = "NAME", value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Persistent tables to check; a selection that checks nothing is an error
fn verify_targets(names: &[String]) -> Result<Vec<TableDef>> {
    if names.is_empty() {
        return Ok(PERSISTENT_TABLES.to_vec());
    }

    let plan = ResetPlan::for_tables(names)?;
    if plan.tables().is_empty() {
        bail!(
            "nothing to verify: {} only exists inside the session that creates it",
            TEMP_NEWS.name
        );
    }
    Ok(plan.tables().iter().map(|t| **t).collect())
}

pub async fn run_verify(args: VerifyArgs) -> Result<()> {
    let tables = verify_targets(&args.tables)?;
    let config = args.db.resolve()?;

    let mut conn = connect(&config.connect_options(), &config.redacted()).await?;
    let result = inspect(&mut conn, &tables).await;
    if let Err(e) = conn.close().await {
        warn!("Failed to close connection: {}", e);
    }
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_in_sync() {
        println!(
            "✅ {} in sync on {}",
            report.tables_checked.join(", "),
            config
        );
    } else {
        println!("✗ Schema drift on {}:", config);
        for drift in &report.drift {
            println!("  - {}", drift);
        }
    }

    if !report.is_in_sync() {
        bail!("{} schema difference(s) found", report.drift.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tables: &[TableDef]) -> Vec<&'static str> {
        tables.iter().map(|t| t.name).collect()
    }

    #[test]
    fn test_default_targets_are_persistent_tables() {
        let tables = verify_targets(&[]).unwrap();
        assert_eq!(names(&tables), vec!["news", "sample", "news_article"]);
    }

    #[test]
    fn test_session_table_alone_is_rejected() {
        let err = verify_targets(&["temp_news".to_string()]).unwrap_err();
        assert!(err.to_string().contains("nothing to verify"));
    }

    #[test]
    fn test_session_table_is_dropped_from_mixed_selection() {
        let tables = verify_targets(&["temp_news".to_string(), "sample".to_string()]).unwrap();
        assert_eq!(names(&tables), vec!["sample"]);
    }
}
