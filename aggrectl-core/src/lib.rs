pub mod catalog;
pub mod config;
pub mod error;
pub mod initializer;
pub mod inspect;
pub mod plan;

pub use catalog::{ColumnDef, Lifetime, SqlType, TableDef};
pub use config::{AggreConfig, ConnectionConfig, DatabaseSettings};
pub use error::{ConfigError, PlanError, Result, SchemaError};
pub use initializer::{connect, InitReport, SchemaInitializer};
pub use inspect::{inspect, Drift, SchemaReport};
pub use plan::{ResetPlan, Statement};
