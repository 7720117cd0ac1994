//! Command implementations for aggrectl CLI

pub mod init;
pub mod plan;
pub mod tables;
pub mod verify;

use aggrectl_core::{PlanError, ResetPlan};
use anyhow::Result;
use clap::Args;

// Re-export main dispatcher functions for flat access from main.rs
pub use init::run_init;
pub use plan::run_plan;
pub use tables::run_tables;
pub use verify::run_verify;

/// Which tables a command works on
#[derive(Args, Debug, Clone, Default)]
pub struct TableSelection {
    /// Only this table (repeatable or comma-separated; default: all)
    #[arg(long = "table", short = 't', value_name = "NAME", value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Leave out the session staging table (temp_news)
    #[arg(long)]
    pub no_staging: bool,
}

impl TableSelection {
    pub fn plan(&self) -> Result<ResetPlan> {
        let plan = if self.tables.is_empty() {
            ResetPlan::full()
        } else {
            ResetPlan::for_tables(&self.tables)?
        };
        let plan = if self.no_staging {
            plan.with_staging(false)
        } else {
            plan
        };

        if plan.statements().is_empty() {
            return Err(PlanError::Empty.into());
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_full_plan() {
        let plan = TableSelection::default().plan().unwrap();
        assert_eq!(plan, ResetPlan::full());
    }

    #[test]
    fn test_no_staging_only_selection_is_empty() {
        let selection = TableSelection {
            tables: vec!["temp_news".into()],
            no_staging: true,
        };
        let err = selection.plan().unwrap_err();
        assert_eq!(err.downcast_ref::<PlanError>(), Some(&PlanError::Empty));
    }
}
