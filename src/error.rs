//! Error types for the generator.
//!
//! Hard failures abort a run and are returned as [`GenError`]. Per-column
//! problems never abort; they are recorded as [`ColumnFailure`] reasons on the
//! table they belong to.

use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Fatal errors that stop the whole run.
#[derive(Error, Debug)]
pub enum GenError {
    /// No migration files matched, or none of them yielded a table
    #[error("no migrations found in {0}")]
    NoMigrations(String),

    /// A migration has no `CREATE TABLE` clause
    #[error("table name not found in {0}")]
    TableNameNotFound(String),

    /// Two migrations create the same table
    #[error("table `{table}` is created by both {} and {}", .first.display(), .second.display())]
    DuplicateTable {
        table: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A migration file could not be read
    #[error("reading {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination could not be created or written
    #[error("writing {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model source could not be rendered
    #[error("rendering model: {0}")]
    Render(#[from] std::fmt::Error),

    /// Invalid discovery pattern
    #[error("invalid migration pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML config could not be parsed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON report could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Why a line in the column block did not become a column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnFailure {
    #[error("does not match expected column format")]
    UnexpectedFormat,

    #[error("unsupported column type: `{0}`")]
    UnsupportedType(String),

    #[error("enum type found but no values present")]
    MissingEnumValues,

    #[error("table-level constraint, not a column")]
    TableConstraint,
}

impl Serialize for ColumnFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
