// src/model/mod.rs

use serde::Serialize;

use crate::catalog::CanonicalType;
use crate::error::ColumnFailure;

/// A table's name as written in the migration and its CamelCase rendering.
#[derive(Debug, Serialize, PartialEq, Clone, Eq, Default)]
pub struct TableNames {
    pub original: String,
    pub camel_case: String,
}

/// A single column definition as parsed from a `CREATE TABLE` block.
#[derive(Debug, Serialize, PartialEq, Clone, Eq)]
pub struct Column {
    pub original_name: String,
    pub camel_case_name: String,
    pub canonical_type: CanonicalType,
    pub default_value: Option<String>,
    /// Only populated for `enum` columns, in source order.
    pub enum_values: Vec<String>,
    pub is_nullable: bool,
}

impl Column {
    pub fn is_enum(&self) -> bool {
        self.canonical_type == CanonicalType::Enum
    }

    pub fn is_time(&self) -> bool {
        self.canonical_type == CanonicalType::Time
    }
}

/// A line of the column block that could not be turned into a [`Column`].
#[derive(Debug, Serialize, PartialEq, Clone, Eq)]
pub struct FailedParsedColumn {
    pub original_name: String,
    pub camel_case_name: String,
    /// 1-indexed, counted across the whole migration file.
    pub line_number: usize,
    pub reason: ColumnFailure,
}

/// Everything parsed out of one migration file.
#[derive(Debug, Serialize, PartialEq, Clone, Eq, Default)]
pub struct Database {
    pub table_names: TableNames,
    pub columns: Vec<Column>,
    pub failed_parse_columns: Vec<FailedParsedColumn>,
    /// Set by table selection; disabled tables are not emitted.
    pub disabled: bool,
}

impl Database {
    pub fn has_time(&self) -> bool {
        self.columns.iter().any(Column::is_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: CanonicalType) -> Column {
        Column {
            original_name: name.to_string(),
            camel_case_name: name.to_string(),
            canonical_type: ty,
            default_value: None,
            enum_values: Vec::new(),
            is_nullable: true,
        }
    }

    #[test]
    fn has_time_looks_at_every_column() {
        let mut db = Database {
            columns: vec![column("id", CanonicalType::Int)],
            ..Default::default()
        };
        assert!(!db.has_time());

        db.columns.push(column("created_at", CanonicalType::Time));
        assert!(db.has_time());
    }
}
