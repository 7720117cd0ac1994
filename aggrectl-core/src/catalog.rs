//! Table catalog for the news aggregator database
//!
//! Every table the reset knows about is declared here once. DDL is rendered
//! from these definitions so the `DROP`/`CREATE` statements and the schema
//! inspection in [`crate::inspect`] can never disagree.

use std::fmt;

use serde::Serialize;

/// Column type as written in DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// Auto-incrementing integer (`SERIAL`)
    Serial,
    Varchar(u32),
    Text,
    /// `TIMESTAMP` (without time zone)
    Timestamp,
}

impl SqlType {
    /// Type name as written in `CREATE TABLE`
    pub fn ddl(&self) -> String {
        match self {
            SqlType::Serial => "SERIAL".to_string(),
            SqlType::Varchar(len) => format!("VARCHAR({len})"),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
        }
    }

    /// Type name as reported by `information_schema.columns.data_type`
    pub fn catalog_name(&self) -> &'static str {
        match self {
            SqlType::Serial => "integer",
            SqlType::Varchar(_) => "character varying",
            SqlType::Text => "text",
            SqlType::Timestamp => "timestamp without time zone",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ddl())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            primary_key: false,
            not_null: false,
        }
    }

    const fn key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    const fn not_null(self) -> Self {
        Self {
            not_null: true,
            ..self
        }
    }

    /// Whether the live column must reject NULLs (primary keys always do)
    pub fn is_required(&self) -> bool {
        self.primary_key || self.not_null
    }

    fn ddl(&self) -> String {
        let mut out = format!("{} {}", self.name, self.sql_type.ddl());
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        } else if self.not_null {
            out.push_str(" NOT NULL");
        }
        out
    }
}

/// How long a table lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    Persistent,
    /// Dropped by the server when the creating session ends
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableDef {
    pub name: &'static str,
    pub lifetime: Lifetime,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn is_temporary(&self) -> bool {
        self.lifetime == Lifetime::Session
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn create_sql(&self) -> String {
        let temporary = if self.is_temporary() { "TEMPORARY " } else { "" };
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.ddl()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE {temporary}TABLE IF NOT EXISTS {} (\n{columns}\n)",
            self.name
        )
    }
}

const fn col(name: &'static str, sql_type: SqlType) -> ColumnDef {
    ColumnDef::new(name, sql_type)
}

/// Articles pulled from the news API
pub const NEWS: TableDef = TableDef {
    name: "news",
    lifetime: Lifetime::Persistent,
    columns: &[
        col("id", SqlType::Serial).key(),
        col("title", SqlType::Varchar(255)),
        col("content", SqlType::Text),
        col("source_name", SqlType::Varchar(255)),
        col("published_at", SqlType::Timestamp),
        col("url", SqlType::Varchar(255)),
        col("img", SqlType::Varchar(255)),
    ],
};

/// Per-session staging area for a news fetch, shaped like `news` without an id
pub const TEMP_NEWS: TableDef = TableDef {
    name: "temp_news",
    lifetime: Lifetime::Session,
    columns: &[
        col("title", SqlType::Varchar(255)),
        col("content", SqlType::Text),
        col("source_name", SqlType::Varchar(255)),
        col("published_at", SqlType::Timestamp),
        col("url", SqlType::Varchar(255)),
        col("img", SqlType::Varchar(255)),
    ],
};

/// Scraped article bodies
pub const SAMPLE: TableDef = TableDef {
    name: "sample",
    lifetime: Lifetime::Persistent,
    columns: &[
        col("id", SqlType::Serial).key(),
        col("title", SqlType::Text).not_null(),
        col("content", SqlType::Text).not_null(),
        col("original_url", SqlType::Text).not_null(),
        col("image_url", SqlType::Text),
    ],
};

/// Summarized, sentiment-scored articles served to readers
pub const NEWS_ARTICLE: TableDef = TableDef {
    name: "news_article",
    lifetime: Lifetime::Persistent,
    columns: &[
        col("id", SqlType::Serial).key(),
        col("title", SqlType::Varchar(255)),
        col("content", SqlType::Text),
        col("original_url", SqlType::Text),
        col("image_url", SqlType::Text),
        col("score", SqlType::Varchar(255)),
    ],
};

/// Persistent tables in creation order
pub const PERSISTENT_TABLES: &[TableDef] = &[NEWS, SAMPLE, NEWS_ARTICLE];

/// Every table, persistent first
pub const ALL_TABLES: &[TableDef] = &[NEWS, SAMPLE, NEWS_ARTICLE, TEMP_NEWS];

/// Look up a table definition by name (case-insensitive)
pub fn table(name: &str) -> Option<&'static TableDef> {
    ALL_TABLES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

/// Comma-separated list of table names, for error messages
pub fn table_names() -> String {
    ALL_TABLES
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_has_seven_columns_with_id_primary_key() {
        assert_eq!(NEWS.columns.len(), 7);
        let pk = NEWS.primary_key().unwrap();
        assert_eq!(pk.name, "id");
        assert_eq!(pk.sql_type, SqlType::Serial);
    }

    #[test]
    fn test_temp_news_mirrors_news_without_id() {
        assert!(TEMP_NEWS.is_temporary());
        assert!(TEMP_NEWS.primary_key().is_none());

        let news_cols: Vec<_> = NEWS.columns.iter().skip(1).collect();
        let temp_cols: Vec<_> = TEMP_NEWS.columns.iter().collect();
        assert_eq!(news_cols, temp_cols);
    }

    #[test]
    fn test_sample_required_columns() {
        let required: Vec<_> = SAMPLE
            .columns
            .iter()
            .filter(|c| c.is_required())
            .map(|c| c.name)
            .collect();
        assert_eq!(required, vec!["id", "title", "content", "original_url"]);
        assert!(!SAMPLE.column("image_url").unwrap().is_required());
    }

    #[test]
    fn test_create_sql_is_guarded() {
        for table in ALL_TABLES {
            assert!(
                table.create_sql().contains("IF NOT EXISTS"),
                "{} create is unguarded",
                table.name
            );
            assert!(table.drop_sql().starts_with("DROP TABLE IF EXISTS"));
        }
    }

    #[test]
    fn test_create_sql_renders_columns() {
        let sql = NEWS_ARTICLE.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS news_article ("));
        assert!(sql.contains("    id SERIAL PRIMARY KEY,\n"));
        assert!(sql.contains("    score VARCHAR(255)\n)"));

        let sql = SAMPLE.create_sql();
        assert!(sql.contains("title TEXT NOT NULL"));
        assert!(sql.contains("image_url TEXT\n"));
    }

    #[test]
    fn test_temporary_create_sql() {
        let sql = TEMP_NEWS.create_sql();
        assert!(sql.starts_with("CREATE TEMPORARY TABLE IF NOT EXISTS temp_news"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(table("NEWS").map(|t| t.name), Some("news"));
        assert_eq!(table(" sample ").map(|t| t.name), Some("sample"));
        assert!(table("articles").is_none());
    }

    #[test]
    fn test_catalog_type_names() {
        assert_eq!(SqlType::Serial.catalog_name(), "integer");
        assert_eq!(SqlType::Varchar(255).catalog_name(), "character varying");
        assert_eq!(SqlType::Timestamp.catalog_name(), "timestamp without time zone");
        assert_eq!(SqlType::Varchar(255).to_string(), "VARCHAR(255)");
    }
}
