//! Compare table definitions against the live catalog
//!
//! Reads `information_schema` for the connection's current schema. Session
//! tables are skipped: they only exist inside the session that created them.

use serde::Serialize;
use sqlx::postgres::PgConnection;
use sqlx::FromRow;

use crate::catalog::TableDef;
use crate::error::{Result, SchemaError};

/// One difference between a table definition and the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    MissingTable {
        table: String,
    },
    MissingColumn {
        table: String,
        column: String,
    },
    UnexpectedColumn {
        table: String,
        column: String,
    },
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    NullabilityMismatch {
        table: String,
        column: String,
        expected_nullable: bool,
        actual_nullable: bool,
    },
    MissingPrimaryKey {
        table: String,
        column: String,
    },
}

impl std::fmt::Display for Drift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Drift::MissingTable { table } => write!(f, "{table}: table is missing"),
            Drift::MissingColumn { table, column } => {
                write!(f, "{table}.{column}: column is missing")
            }
            Drift::UnexpectedColumn { table, column } => {
                write!(f, "{table}.{column}: column is not in the definition")
            }
            Drift::TypeMismatch {
                table,
                column,
                expected,
                actual,
            } => write!(f, "{table}.{column}: expected {expected}, found {actual}"),
            Drift::NullabilityMismatch {
                table,
                column,
                expected_nullable,
                ..
            } => {
                let expected = if *expected_nullable { "nullable" } else { "NOT NULL" };
                write!(f, "{table}.{column}: expected {expected}")
            }
            Drift::MissingPrimaryKey { table, column } => {
                write!(f, "{table}.{column}: expected PRIMARY KEY")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub tables_checked: Vec<&'static str>,
    pub drift: Vec<Drift>,
}

impl SchemaReport {
    pub fn is_in_sync(&self) -> bool {
        self.drift.is_empty()
    }
}

/// Column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LiveColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Check every persistent table in `tables` against the live schema
pub async fn inspect(conn: &mut PgConnection, tables: &[TableDef]) -> Result<SchemaReport> {
    let mut report = SchemaReport {
        tables_checked: Vec::new(),
        drift: Vec::new(),
    };

    for table in tables.iter().filter(|t| !t.is_temporary()) {
        report.tables_checked.push(table.name);

        if !table_exists(conn, table.name).await? {
            report.drift.push(Drift::MissingTable {
                table: table.name.to_string(),
            });
            continue;
        }

        let columns = live_columns(conn, table.name).await?;
        let primary_key = primary_key_columns(conn, table.name).await?;
        report.drift.extend(compare(table, &columns, &primary_key));
    }

    Ok(report)
}

/// Whether a base table named `name` exists in the current schema
pub async fn table_exists(conn: &mut PgConnection, name: &str) -> Result<bool> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = current_schema()
              AND table_name = $1
              AND table_type = 'BASE TABLE'
        )
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(|source| SchemaError::statement(format!("inspect table {name}"), source))
}

async fn live_columns(conn: &mut PgConnection, table: &str) -> Result<Vec<LiveColumn>> {
    sqlx::query_as::<_, LiveColumn>(
        r#"
        SELECT column_name::text AS name,
               data_type::text AS data_type,
               (is_nullable = 'YES') AS nullable
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = $1
        ORDER BY ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(|source| SchemaError::statement(format!("inspect columns of {table}"), source))
}

async fn primary_key_columns(conn: &mut PgConnection, table: &str) -> Result<Vec<String>> {
    sqlx::query_scalar(
        r#"
        SELECT kcu.column_name::text
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
          ON tc.constraint_name = kcu.constraint_name
         AND tc.table_schema = kcu.table_schema
         AND tc.table_name = kcu.table_name
        WHERE tc.constraint_type = 'PRIMARY KEY'
          AND tc.table_schema = current_schema()
          AND tc.table_name = $1
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(|source| SchemaError::statement(format!("inspect primary key of {table}"), source))
}

/// Diff one table definition against its live columns
pub fn compare(table: &TableDef, live: &[LiveColumn], primary_key: &[String]) -> Vec<Drift> {
    let mut drift = Vec::new();
    let name = table.name.to_string();

    for column in table.columns {
        let Some(actual) = live.iter().find(|c| c.name == column.name) else {
            drift.push(Drift::MissingColumn {
                table: name.clone(),
                column: column.name.to_string(),
            });
            continue;
        };

        let expected_type = column.sql_type.catalog_name();
        if actual.data_type != expected_type {
            drift.push(Drift::TypeMismatch {
                table: name.clone(),
                column: column.name.to_string(),
                expected: expected_type.to_string(),
                actual: actual.data_type.clone(),
            });
        }

        let expected_nullable = !column.is_required();
        if actual.nullable != expected_nullable {
            drift.push(Drift::NullabilityMismatch {
                table: name.clone(),
                column: column.name.to_string(),
                expected_nullable,
                actual_nullable: actual.nullable,
            });
        }

        if column.primary_key && !primary_key.iter().any(|pk| pk == column.name) {
            drift.push(Drift::MissingPrimaryKey {
                table: name.clone(),
                column: column.name.to_string(),
            });
        }
    }

    for actual in live {
        if table.column(&actual.name).is_none() {
            drift.push(Drift::UnexpectedColumn {
                table: name.clone(),
                column: actual.name.clone(),
            });
        }
    }

    drift
}
