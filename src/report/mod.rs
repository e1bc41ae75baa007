// src/report/mod.rs

use serde::Serialize;
use std::path::Path;

use crate::emit::{stage, Staged};
use crate::error::Result;
use crate::model::{Database, FailedParsedColumn};

/// Per-table diagnostics as written to the JSON report.
#[derive(Debug, Serialize)]
pub struct TableReport<'a> {
    pub table: &'a str,
    pub model: &'a str,
    pub columns: usize,
    pub failed: usize,
    pub disabled: bool,
    pub failed_columns: &'a [FailedParsedColumn],
}

pub fn build(databases: &[Database]) -> Vec<TableReport<'_>> {
    databases
        .iter()
        .map(|db| TableReport {
            table: &db.table_names.original,
            model: &db.table_names.camel_case,
            columns: db.columns.len(),
            failed: db.failed_parse_columns.len(),
            disabled: db.disabled,
            failed_columns: &db.failed_parse_columns,
        })
        .collect()
}

pub fn to_json(databases: &[Database]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(&build(databases))?;
    json.push('\n');
    Ok(json)
}

/// Write the JSON report to a temp file beside `path`, ready for
/// [`crate::emit::commit`].
pub fn stage_json<P: AsRef<Path>>(path: P, databases: &[Database]) -> Result<Staged> {
    stage(path.as_ref(), to_json(databases)?.as_bytes())
}

/// Human-readable summary: one row per table, then one row per rejected
/// column for manual follow-up.
pub fn summary_table(databases: &[Database]) -> String {
    let tables: Vec<Vec<String>> = databases
        .iter()
        .map(|db| {
            vec![
                db.table_names.original.clone(),
                db.table_names.camel_case.clone(),
                db.columns.len().to_string(),
                db.failed_parse_columns.len().to_string(),
                if db.disabled { "disabled" } else { "enabled" }.to_string(),
            ]
        })
        .collect();
    let mut out = render_rows(&["TABLE", "MODEL", "COLUMNS", "FAILED", "STATUS"], &tables);

    let failures: Vec<Vec<String>> = databases
        .iter()
        .flat_map(|db| {
            db.failed_parse_columns.iter().map(move |f| {
                vec![
                    db.table_names.original.clone(),
                    f.line_number.to_string(),
                    f.original_name.clone(),
                    f.reason.to_string(),
                ]
            })
        })
        .collect();
    if !failures.is_empty() {
        out.push('\n');
        out.push_str(&render_rows(&["TABLE", "LINE", "COLUMN", "REASON"], &failures));
    }
    out
}

fn render_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = format_row(headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_row(rule.iter().map(String::as_str), &widths));
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str), &widths));
    }
    out
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, w)| format!("{:w$}", cell, w = *w))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}
