//! Tables command - list the table catalog

use aggrectl_core::catalog::ALL_TABLES;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct TablesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_tables(args: TablesArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(ALL_TABLES)?);
        return Ok(());
    }

    for table in ALL_TABLES {
        let scope = if table.is_temporary() { " (session)" } else { "" };
        println!("{}{}", table.name, scope);
        for column in table.columns {
            let constraint = if column.primary_key {
                " PRIMARY KEY"
            } else if column.not_null {
                " NOT NULL"
            } else {
                ""
            };
            println!("  {:<14} {}{}", column.name, column.sql_type, constraint);
        }
    }
    Ok(())
}
