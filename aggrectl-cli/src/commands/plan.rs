//! Plan command - print the reset script without touching the database

use anyhow::Result;
use clap::Parser;

use super::TableSelection;

#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: TableSelection,
}

pub fn run_plan(args: PlanArgs) -> Result<()> {
    let plan = args.selection.plan()?;
    print!("{}", plan.render());
    Ok(())
}
