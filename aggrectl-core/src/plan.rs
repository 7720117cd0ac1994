//! Reset plan: the ordered DDL a run executes
//!
//! All drops come before all creates. Drops run in reverse catalog order,
//! creates in catalog order. Every statement is guarded (`IF EXISTS` /
//! `IF NOT EXISTS`) so the plan can be executed any number of times.

use std::fmt;

use crate::catalog::{self, TableDef, PERSISTENT_TABLES, TEMP_NEWS};
use crate::error::PlanError;

/// One DDL statement with a human-readable label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub label: String,
    pub sql: String,
}

impl Statement {
    pub fn new(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sql: sql.into(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- {}\n{};", self.label, self.sql)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPlan {
    tables: Vec<&'static TableDef>,
    staging: bool,
}

impl Default for ResetPlan {
    fn default() -> Self {
        Self::full()
    }
}

impl ResetPlan {
    /// Reset every persistent table and create the session staging table
    pub fn full() -> Self {
        Self {
            tables: PERSISTENT_TABLES.iter().collect(),
            staging: true,
        }
    }

    /// Reset only the named tables.
    ///
    /// Names are matched case-insensitively and duplicates are collapsed.
    /// Naming the staging table (`temp_news`) turns staging on; persistent
    /// tables keep catalog order regardless of the order given.
    pub fn for_tables<I, S>(names: I) -> Result<Self, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<&'static TableDef> = Vec::new();
        let mut staging = false;

        for name in names {
            let name = name.as_ref();
            let def = catalog::table(name).ok_or_else(|| PlanError::UnknownTable {
                name: name.trim().to_string(),
                known: catalog::table_names(),
            })?;
            if def.is_temporary() {
                staging = true;
            } else if !selected.iter().any(|t| t.name == def.name) {
                selected.push(def);
            }
        }

        if selected.is_empty() && !staging {
            return Err(PlanError::Empty);
        }

        let tables = PERSISTENT_TABLES
            .iter()
            .filter(|t| selected.iter().any(|s| s.name == t.name))
            .collect();

        Ok(Self { tables, staging })
    }

    /// Include or leave out the session staging table
    pub fn with_staging(mut self, staging: bool) -> Self {
        self.staging = staging;
        self
    }

    pub fn includes_staging(&self) -> bool {
        self.staging
    }

    /// Persistent tables this plan resets, in creation order
    pub fn tables(&self) -> &[&'static TableDef] {
        &self.tables
    }

    /// Names of every table the plan creates, staging last
    pub fn table_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tables.iter().map(|t| t.name).collect();
        if self.staging {
            names.push(TEMP_NEWS.name);
        }
        names
    }

    pub fn statements(&self) -> Vec<Statement> {
        let mut out = Vec::with_capacity(self.tables.len() * 2 + 1);

        for table in self.tables.iter().rev() {
            out.push(Statement::new(
                format!("drop table {}", table.name),
                table.drop_sql(),
            ));
        }
        for table in &self.tables {
            out.push(Statement::new(
                format!("create table {}", table.name),
                table.create_sql(),
            ));
        }
        if self.staging {
            out.push(Statement::new(
                format!("create staging table {}", TEMP_NEWS.name),
                TEMP_NEWS.create_sql(),
            ));
        }

        out
    }

    /// Full SQL script for dry runs
    pub fn render(&self) -> String {
        let mut script = String::from("BEGIN;\n\n");
        for statement in self.statements() {
            script.push_str(&statement.to_string());
            script.push_str("\n\n");
        }
        script.push_str("COMMIT;\n");
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(plan: &ResetPlan) -> Vec<String> {
        plan.statements().into_iter().map(|s| s.label).collect()
    }

    #[test]
    fn test_full_plan_order() {
        let plan = ResetPlan::full();
        assert_eq!(
            labels(&plan),
            vec![
                "drop table news_article",
                "drop table sample",
                "drop table news",
                "create table news",
                "create table sample",
                "create table news_article",
                "create staging table temp_news",
            ]
        );
    }

    #[test]
    fn test_every_statement_is_guarded() {
        for statement in ResetPlan::full().statements() {
            assert!(
                statement.sql.contains("IF EXISTS") || statement.sql.contains("IF NOT EXISTS"),
                "unguarded statement: {}",
                statement.sql
            );
        }
    }

    #[test]
    fn test_staging_is_never_dropped() {
        let plan = ResetPlan::full();
        assert!(!plan
            .statements()
            .iter()
            .any(|s| s.sql.starts_with("DROP") && s.sql.contains("temp_news")));
    }

    #[test]
    fn test_without_staging() {
        let plan = ResetPlan::full().with_staging(false);
        assert_eq!(plan.statements().len(), 6);
        assert_eq!(plan.table_names(), vec!["news", "sample", "news_article"]);
    }

    #[test]
    fn test_selected_tables_keep_catalog_order() {
        let plan = ResetPlan::for_tables(["news_article", "NEWS", "news"]).unwrap();
        assert_eq!(plan.table_names(), vec!["news", "news_article"]);
        assert!(!plan.includes_staging());
        assert_eq!(
            labels(&plan),
            vec![
                "drop table news_article",
                "drop table news",
                "create table news",
                "create table news_article",
            ]
        );
    }

    #[test]
    fn test_single_table_reset() {
        let plan = ResetPlan::for_tables(["sample"]).unwrap();
        let statements = plan.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].sql, "DROP TABLE IF EXISTS sample");
        assert!(statements[1].sql.starts_with("CREATE TABLE IF NOT EXISTS sample"));
    }

    #[test]
    fn test_naming_staging_table_enables_staging() {
        let plan = ResetPlan::for_tables(["temp_news"]).unwrap();
        assert!(plan.includes_staging());
        assert!(plan.tables().is_empty());
        assert_eq!(labels(&plan), vec!["create staging table temp_news"]);
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let err = ResetPlan::for_tables(["news", "articles"]).unwrap_err();
        match err {
            PlanError::UnknownTable { name, known } => {
                assert_eq!(name, "articles");
                assert!(known.contains("news_article"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let names: [&str; 0] = [];
        assert_eq!(ResetPlan::for_tables(names).unwrap_err(), PlanError::Empty);
    }

    #[test]
    fn test_render_wraps_in_transaction() {
        let script = ResetPlan::for_tables(["sample"]).unwrap().render();
        assert!(script.starts_with("BEGIN;\n"));
        assert!(script.trim_end().ends_with("COMMIT;"));
        assert!(script.contains("-- drop table sample\nDROP TABLE IF EXISTS sample;"));
    }
}
