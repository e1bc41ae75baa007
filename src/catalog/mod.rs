// src/catalog/mod.rs

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// The closed set of value kinds a column can normalize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    Int,
    Uint,
    Float,
    String,
    Enum,
    Bool,
    Time,
    Bytes,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 8] = [
        CanonicalType::Int,
        CanonicalType::Uint,
        CanonicalType::Float,
        CanonicalType::String,
        CanonicalType::Enum,
        CanonicalType::Bool,
        CanonicalType::Time,
        CanonicalType::Bytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Int => "int",
            CanonicalType::Uint => "uint",
            CanonicalType::Float => "float",
            CanonicalType::String => "string",
            CanonicalType::Enum => "enum",
            CanonicalType::Bool => "bool",
            CanonicalType::Time => "time",
            CanonicalType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw MySQL spellings recognized for each canonical type.
///
/// - INT family                          → int
/// - INT family + UNSIGNED, `uint ...`   → uint
/// - FLOAT, DOUBLE, DECIMAL, NUMERIC     → float (unsigned variants too)
/// - CHAR, VARCHAR, *TEXT, SET           → string
/// - ENUM                                → enum
/// - BOOL, BOOLEAN                       → bool
/// - DATE, DATETIME, TIMESTAMP, TIME, YEAR → time
/// - *BLOB, BINARY, VARBINARY, JSON      → bytes
pub const SYNONYMS: &[(CanonicalType, &[&str])] = &[
    (
        CanonicalType::Int,
        &["int", "integer", "tinyint", "smallint", "mediumint", "bigint"],
    ),
    (
        CanonicalType::Uint,
        &[
            "uint",
            "uint tinyint",
            "uint smallint",
            "uint mediumint",
            "uint int",
            "uint bigint",
            "int unsigned",
            "integer unsigned",
            "tinyint unsigned",
            "smallint unsigned",
            "mediumint unsigned",
            "bigint unsigned",
        ],
    ),
    (
        CanonicalType::Float,
        &[
            "float",
            "double",
            "decimal",
            "dec",
            "numeric",
            "float unsigned",
            "double unsigned",
            "decimal unsigned",
            "dec unsigned",
            "numeric unsigned",
        ],
    ),
    (
        CanonicalType::String,
        &[
            "char",
            "varchar",
            "text",
            "tinytext",
            "mediumtext",
            "longtext",
            "set",
        ],
    ),
    (CanonicalType::Enum, &["enum"]),
    (CanonicalType::Bool, &["bool", "boolean"]),
    (
        CanonicalType::Time,
        &["date", "datetime", "timestamp", "time", "year"],
    ),
    (
        CanonicalType::Bytes,
        &[
            "blob",
            "tinyblob",
            "mediumblob",
            "longblob",
            "binary",
            "varbinary",
            "json",
        ],
    ),
];

static LOOKUP: Lazy<HashMap<&'static str, CanonicalType>> = Lazy::new(|| {
    SYNONYMS
        .iter()
        .flat_map(|(canonical, raws)| raws.iter().map(move |raw| (*raw, *canonical)))
        .collect()
});

/// Resolve a raw SQL type token to its canonical type.
///
/// Case-insensitive, surrounding whitespace ignored, inner runs of whitespace
/// collapsed so `BIGINT   UNSIGNED` matches `bigint unsigned`. `None` means the
/// token is not cataloged; callers treat that as a soft failure.
pub fn normalize(raw: &str) -> Option<CanonicalType> {
    let key = raw
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    LOOKUP.get(key.as_str()).copied()
}
