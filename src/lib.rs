//! # modelgen
//!
//! Generates Go model structs from MySQL `CREATE TABLE` migrations.
//!
//! Each migration is parsed line by line into a [`Database`]: columns whose
//! types resolve through the [`catalog`] become fields, everything else is
//! kept as a per-column diagnostic instead of failing the run. Enum columns
//! get a table-scoped string type with one constant per value.
//!
//! ```rust,no_run
//! use modelgen::{pipeline, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("modelgen.yaml")?;
//!     let summary = pipeline::run(&config, false)?;
//!     println!("wrote {} models", summary.written.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod emit;
pub mod error;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod select;
pub mod synth;

pub use catalog::{normalize, CanonicalType};
pub use config::Config;
pub use error::{ColumnFailure, GenError, Result};
pub use model::{Column, Database, FailedParsedColumn, TableNames};
pub use pipeline::{run, RunSummary};
pub use synth::{synthesize, CustomType, Field};
