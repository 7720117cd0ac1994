//! Init command - drop and recreate the schema in one transaction

use aggrectl_core::catalog;
use aggrectl_core::{SchemaError, SchemaInitializer};
use anyhow::Result;
use clap::Parser;
use tracing::error;

use super::TableSelection;
use crate::connection::DbArgs;

#[derive(Parser, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub selection: TableSelection,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_init(args: InitArgs) -> Result<()> {
    let plan = args.selection.plan()?;
    let config = args.db.resolve()?;

    let initializer = SchemaInitializer::new(plan);
    let report = match initializer.initialize(&config).await {
        Ok(report) => report,
        Err(err) => {
            error!(kind = err.kind(), "Schema reset failed, no changes were committed");
            return Err(explain(err));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "✅ Reset {} on {} ({} statements)",
            describe_tables(&report.tables),
            config,
            report.statements_applied
        );
    }
    Ok(())
}

/// Table list for the success line; the staging table ends with the session
fn describe_tables(tables: &[&str]) -> String {
    tables
        .iter()
        .map(|name| match catalog::table(name) {
            Some(table) if table.is_temporary() => format!("{name} (session)"),
            _ => name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn explain(err: SchemaError) -> anyhow::Error {
    let hint = if err.is_auth_failure() {
        "authentication rejected; check AGGRE_DB_USER / AGGRE_DB_PASSWORD"
    } else {
        match err {
            SchemaError::Connection { .. } => "database unreachable",
            SchemaError::Statement { .. } => "DDL rejected; transaction rolled back",
            SchemaError::Commit { .. } => "commit failed; transaction rolled back",
        }
    };
    anyhow::Error::new(err).context(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_table_is_marked_session() {
        let line = describe_tables(&["news", "sample", "news_article", "temp_news"]);
        assert_eq!(line, "news, sample, news_article, temp_news (session)");
    }

    #[test]
    fn test_persistent_tables_are_unmarked() {
        assert_eq!(describe_tables(&["sample"]), "sample");
    }
}
