// src/parse/ddl.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, trace, warn};

use super::to_camel_case;
use crate::catalog::{self, CanonicalType};
use crate::error::{ColumnFailure, GenError, Result};
use crate::model::{Column, Database, FailedParsedColumn, TableNames};

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"]?(\w+)"#).unwrap()
});
static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CREATE\s+TABLE\b").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());
static UNSIGNED_AFTER_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:\([^)]*\))?\s*UNSIGNED\b").unwrap());
static ENUM_VALUES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)").unwrap());
static DEFAULT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bDEFAULT\s+('[^']*'|"[^"]*"|[^\s,]+)"#).unwrap());
static NOT_NULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());
static TABLE_CONSTRAINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:PRIMARY\s+KEY|FOREIGN\s+KEY|UNIQUE|KEY|INDEX|CONSTRAINT|CHECK|FULLTEXT|SPATIAL)\b",
    )
    .unwrap()
});

/// Parse one migration's raw bytes into a [`Database`].
///
/// Only a missing `CREATE TABLE` clause is fatal. Every line of the column
/// block either becomes a column or lands in `failed_parse_columns`.
#[instrument(level = "debug", skip(bytes), fields(content_len = bytes.len()))]
pub fn parse(bytes: &[u8]) -> Result<Database> {
    debug!("Starting migration parsing");
    let text = String::from_utf8_lossy(bytes);

    let table_names = table_name(&text).ok_or_else(|| {
        warn!("Table name not found during migration parsing");
        GenError::TableNameNotFound("<input>".to_string())
    })?;
    trace!(table = %table_names.original, "Parsed table name");

    let (columns, failed_parse_columns) = parse_columns(&text);
    debug!(
        table = %table_names.original,
        columns = columns.len(),
        failed = failed_parse_columns.len(),
        "Finished migration parsing"
    );

    Ok(Database {
        table_names,
        columns,
        failed_parse_columns,
        disabled: false,
    })
}

/// First identifier after `CREATE TABLE [IF NOT EXISTS]`.
pub fn table_name(text: &str) -> Option<TableNames> {
    let original = TABLE_NAME
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_owned()))?;
    Some(TableNames {
        camel_case: to_camel_case(&original),
        original,
    })
}

/// Classify every line of the column block.
///
/// The block starts after the header line(s) holding `CREATE TABLE` and the
/// opening paren, and ends with the first line starting with `)`. Blank lines
/// and whole-line comments are not part of it.
pub fn parse_columns(text: &str) -> (Vec<Column>, Vec<FailedParsedColumn>) {
    let mut columns = Vec::new();
    let mut failed = Vec::new();
    let mut seen_create = false;
    let mut in_block = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;

        if !in_block {
            if !seen_create && CREATE_TABLE.is_match(raw) {
                seen_create = true;
            }
            if seen_create && raw.contains('(') {
                in_block = true;
            }
            trace!(line_number, "Skipping CREATE TABLE header line");
            continue;
        }

        let line = raw.trim();
        if line.is_empty() || line.starts_with("--") || line.starts_with('#') {
            continue;
        }

        let closing = line.starts_with(')');
        let outcome = if closing {
            Err(Rejected::unnamed(ColumnFailure::UnexpectedFormat))
        } else {
            parse_column_line(line)
        };

        match outcome {
            Ok(column) => {
                trace!(
                    line_number,
                    name = %column.original_name,
                    ty = %column.canonical_type,
                    nullable = column.is_nullable,
                    "Parsed column"
                );
                columns.push(column);
            }
            Err(Rejected { name, reason }) => {
                warn!(line_number, name = %name, reason = %reason, "Skipping column line");
                failed.push(FailedParsedColumn {
                    camel_case_name: to_camel_case(&name),
                    original_name: name,
                    line_number,
                    reason,
                });
            }
        }

        if closing {
            break;
        }
    }

    (columns, failed)
}

struct Rejected {
    name: String,
    reason: ColumnFailure,
}

impl Rejected {
    fn unnamed(reason: ColumnFailure) -> Self {
        Self {
            name: String::new(),
            reason,
        }
    }

    fn named(name: &str, reason: ColumnFailure) -> Self {
        Self {
            name: name.to_owned(),
            reason,
        }
    }
}

fn parse_column_line(line: &str) -> std::result::Result<Column, Rejected> {
    let line = line.trim_matches(',').trim();
    let tokens: Vec<regex::Match<'_>> = WORD.find_iter(line).collect();
    let first = tokens.first().map(|m| m.as_str()).unwrap_or_default();

    if TABLE_CONSTRAINT.is_match(line) {
        return Err(Rejected::named(first, ColumnFailure::TableConstraint));
    }

    let (name, raw_type) = match tokens.as_slice() {
        [name, raw_type, ..] => (name.as_str(), *raw_type),
        _ => return Err(Rejected::named(first, ColumnFailure::UnexpectedFormat)),
    };

    let mut canonical_type = catalog::normalize(raw_type.as_str()).ok_or_else(|| {
        Rejected::named(
            name,
            ColumnFailure::UnsupportedType(raw_type.as_str().to_owned()),
        )
    })?;

    if canonical_type == CanonicalType::Int
        && UNSIGNED_AFTER_TYPE.is_match(&line[raw_type.end()..])
    {
        canonical_type = CanonicalType::Uint;
    }

    let enum_values = if canonical_type == CanonicalType::Enum {
        let values = enum_values(line);
        if values.is_empty() {
            return Err(Rejected::named(name, ColumnFailure::MissingEnumValues));
        }
        values
    } else {
        Vec::new()
    };

    Ok(Column {
        original_name: name.to_owned(),
        camel_case_name: to_camel_case(name),
        canonical_type,
        default_value: default_value(line),
        enum_values,
        is_nullable: !NOT_NULL.is_match(line),
    })
}

fn enum_values(line: &str) -> Vec<String> {
    ENUM_VALUES
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|list| {
            list.as_str()
                .split(',')
                .map(|v| v.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn default_value(line: &str) -> Option<String> {
    DEFAULT_VALUE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| strip_quotes(m.as_str()).to_owned())
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(sql: &str) -> Database {
        parse(sql.as_bytes()).unwrap()
    }

    fn counted_lines(sql: &str) -> usize {
        sql.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !CREATE_TABLE.is_match(l))
            .count()
    }

    #[test]
    fn table_name_variants() {
        let names = table_name("CREATE TABLE user_profile (").unwrap();
        assert_eq!(names.original, "user_profile");
        assert_eq!(names.camel_case, "UserProfile");

        let names = table_name("create table if not exists `orders` (").unwrap();
        assert_eq!(names.original, "orders");
        assert_eq!(names.camel_case, "Orders");

        assert!(table_name("DROP TABLE users;").is_none());
    }

    #[test]
    fn missing_create_table_is_fatal() {
        let err = parse(b"ALTER TABLE users ADD COLUMN age int;").unwrap_err();
        assert!(matches!(err, GenError::TableNameNotFound(_)));
    }

    #[test]
    fn well_formed_and_malformed_lines_are_all_accounted_for() {
        let sql = "CREATE TABLE t (\n\
                   id int not null,\n\
                   name varchar(64),\n\
                   \n\
                   oops,\n\
                   shape geojson,\n\
                   created_at datetime\n\
                   );\n";
        let db = parse_str(sql);

        assert_eq!(db.columns.len(), 3);
        assert_eq!(db.failed_parse_columns.len(), 3);
        assert_eq!(
            db.columns.len() + db.failed_parse_columns.len(),
            counted_lines(sql)
        );
    }

    #[test]
    fn enum_column_with_values() {
        let db = parse_str(
            "CREATE TABLE accounts (\n  status ENUM('active','inactive') NOT NULL\n);",
        );
        let status = &db.columns[0];
        assert_eq!(status.canonical_type, CanonicalType::Enum);
        assert!(!status.is_nullable);
        assert_eq!(status.enum_values, ["active", "inactive"]);
    }

    #[test]
    fn enum_without_values_is_rejected() {
        let db = parse_str("CREATE TABLE t (\n  status enum not null,\n  id int\n)");
        assert_eq!(db.columns.len(), 1);
        assert_eq!(db.columns[0].original_name, "id");
        assert_eq!(
            db.failed_parse_columns[0].reason,
            ColumnFailure::MissingEnumValues
        );
        assert_eq!(db.failed_parse_columns[0].original_name, "status");
        assert_eq!(db.failed_parse_columns[0].line_number, 2);
    }

    #[test]
    fn unsigned_promotes_int_only() {
        let db = parse_str(
            "CREATE TABLE t (\n\
             id INT UNSIGNED NOT NULL,\n\
             big bigint(20) unsigned,\n\
             price decimal(10,2) unsigned,\n\
             plain int\n\
             )",
        );
        let types: Vec<_> = db.columns.iter().map(|c| c.canonical_type).collect();
        assert_eq!(
            types,
            [
                CanonicalType::Uint,
                CanonicalType::Uint,
                CanonicalType::Float,
                CanonicalType::Int
            ]
        );
        assert!(!db.columns[0].is_nullable);
        assert!(db.columns[1].is_nullable);
    }

    #[test]
    fn unsigned_elsewhere_on_the_line_is_ignored() {
        let db = parse_str(
            "CREATE TABLE t (\n\
             `id` int not null comment 'unsigned ok',\n\
             flag int(1) default 0 unsigned_note,\n\
             `total` int(10) UNSIGNED default 0\n\
             )",
        );
        let types: Vec<_> = db.columns.iter().map(|c| c.canonical_type).collect();
        assert_eq!(
            types,
            [CanonicalType::Int, CanonicalType::Int, CanonicalType::Uint]
        );
        assert!(db.failed_parse_columns.iter().all(|f| f.original_name.is_empty()));
    }

    #[test]
    fn unknown_type_does_not_stop_later_columns() {
        let db = parse_str("CREATE TABLE t (\n  area geojson,\n  label text not null\n)");
        assert_eq!(db.columns.len(), 1);
        assert_eq!(db.columns[0].original_name, "label");
        let failed = &db.failed_parse_columns[0];
        assert_eq!(failed.original_name, "area");
        assert_eq!(failed.camel_case_name, "Area");
        assert_eq!(failed.line_number, 2);
        assert!(failed.reason.to_string().contains("geojson"));
    }

    #[test]
    fn default_values_are_unquoted() {
        let db = parse_str(
            "CREATE TABLE t (\n\
             role enum('admin','member') not null default 'member',\n\
             score int DEFAULT 0 NOT NULL,\n\
             label varchar(10) default \"n/a\",\n\
             is_default bool\n\
             )",
        );
        let defaults: Vec<_> = db
            .columns
            .iter()
            .map(|c| c.default_value.as_deref())
            .collect();
        assert_eq!(defaults, [Some("member"), Some("0"), Some("n/a"), None]);
        assert!(!db.columns[1].is_nullable);
    }

    #[test]
    fn nullability_defaults_to_nullable() {
        let db = parse_str("CREATE TABLE t (\n  a int,\n  b int NOT   NULL\n)");
        assert!(db.columns[0].is_nullable);
        assert!(!db.columns[1].is_nullable);
    }

    #[test]
    fn constraints_comments_and_trailing_statements() {
        let sql = "-- +migrate Up\n\
                   CREATE TABLE IF NOT EXISTS posts (\n\
                   `id` bigint unsigned not null auto_increment,\n\
                   -- author reference\n\
                   `author_id` int not null,\n\
                   PRIMARY KEY (`id`),\n\
                   KEY idx_author (`author_id`)\n\
                   ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;\n\
                   -- +migrate Down\n\
                   DROP TABLE posts;\n";
        let db = parse_str(sql);

        assert_eq!(db.table_names.original, "posts");
        let names: Vec<_> = db.columns.iter().map(|c| c.original_name.as_str()).collect();
        assert_eq!(names, ["id", "author_id"]);
        assert_eq!(db.columns[0].canonical_type, CanonicalType::Uint);

        let reasons: Vec<_> = db
            .failed_parse_columns
            .iter()
            .map(|f| (f.line_number, f.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            [
                (6, ColumnFailure::TableConstraint),
                (7, ColumnFailure::TableConstraint),
                (8, ColumnFailure::UnexpectedFormat),
            ]
        );
    }

    #[test]
    fn opening_paren_on_its_own_line_is_header() {
        let db = parse_str("CREATE TABLE t\n(\n  id int\n);");
        assert_eq!(db.columns.len(), 1);
        assert_eq!(db.failed_parse_columns.len(), 1);
        assert_eq!(db.failed_parse_columns[0].line_number, 4);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let mut bytes = b"CREATE TABLE t (\n  note text, -- ".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\n)");
        let db = parse(&bytes).unwrap();
        assert_eq!(db.columns[0].canonical_type, CanonicalType::String);
    }
}
