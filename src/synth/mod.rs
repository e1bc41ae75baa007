// src/synth/mod.rs

use tracing::debug;

use crate::catalog::CanonicalType;
use crate::model::Column;

/// One member of the generated record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Rendered Go type, e.g. `int`, `*time.Time`, `UserAccountsRole`.
    pub ty: String,
    /// Persistence mapping tag carrying the original column name.
    pub tag: String,
    pub kind: CanonicalType,
    pub default_value: Option<String>,
}

/// A named string type plus constant set synthesized for an enum column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomType {
    pub name: String,
    pub parent_type: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SynthOptions {
    /// Render nullable scalar columns as pointers.
    pub nullable_pointers: bool,
}

/// Go spelling of a non-enum canonical type.
pub fn go_type(ty: CanonicalType) -> &'static str {
    match ty {
        CanonicalType::Int => "int",
        CanonicalType::Uint => "uint",
        CanonicalType::Float => "float64",
        CanonicalType::String | CanonicalType::Enum => "string",
        CanonicalType::Bool => "bool",
        CanonicalType::Time => "time.Time",
        CanonicalType::Bytes => "[]byte",
    }
}

pub fn db_tag(original_name: &str) -> String {
    format!("db:\"{}\"", original_name)
}

/// Fields and enum types for one table, in column order.
pub fn synthesize(table_camel_name: &str, columns: &[Column]) -> (Vec<Field>, Vec<CustomType>) {
    synthesize_with(table_camel_name, columns, SynthOptions::default())
}

pub fn synthesize_with(
    table_camel_name: &str,
    columns: &[Column],
    opts: SynthOptions,
) -> (Vec<Field>, Vec<CustomType>) {
    let mut fields = Vec::with_capacity(columns.len());
    let mut custom_types = Vec::new();

    for column in columns {
        let ty = if column.is_enum() {
            // table-qualified so equally named enum columns in two tables don't clash
            let name = format!("{}{}", table_camel_name, column.camel_case_name);
            debug!(column = %column.original_name, custom_type = %name, "Synthesized enum type");
            custom_types.push(CustomType {
                name: name.clone(),
                parent_type: go_type(CanonicalType::String).to_string(),
                values: column.enum_values.clone(),
            });
            name
        } else {
            let base = go_type(column.canonical_type);
            if opts.nullable_pointers
                && column.is_nullable
                && column.canonical_type != CanonicalType::Bytes
            {
                format!("*{}", base)
            } else {
                base.to_string()
            }
        };

        fields.push(Field {
            name: column.camel_case_name.clone(),
            ty,
            tag: db_tag(&column.original_name),
            kind: column.canonical_type,
            default_value: column.default_value.clone(),
        });
    }

    (fields, custom_types)
}

pub fn needs_time_import(fields: &[Field]) -> bool {
    fields.iter().any(|f| f.kind == CanonicalType::Time)
}
