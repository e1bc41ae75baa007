// src/select/mod.rs

use std::collections::HashSet;
use tracing::info;

use crate::model::Database;

/// Which tables get emitted. Stands in for an interactive picker: anything
/// that ends up setting `Database::disabled` works with the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    skip: HashSet<String>,
    only: HashSet<String>,
}

impl Selection {
    pub fn new<S, I, J>(skip: I, only: J) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
    {
        let lower = |s: S| s.as_ref().to_ascii_lowercase();
        Self {
            skip: skip.into_iter().map(lower).collect(),
            only: only.into_iter().map(lower).collect(),
        }
    }

    /// Matching is on the original table name, case-insensitive.
    pub fn is_enabled(&self, table: &str) -> bool {
        let table = table.to_ascii_lowercase();
        if self.skip.contains(&table) {
            return false;
        }
        self.only.is_empty() || self.only.contains(&table)
    }

    /// Disable every table the selection rules out; returns how many were disabled.
    pub fn apply(&self, databases: &mut [Database]) -> usize {
        let mut disabled = 0;
        for db in databases.iter_mut() {
            if !self.is_enabled(&db.table_names.original) {
                info!(table = %db.table_names.original, "table disabled by selection");
                db.disabled = true;
                disabled += 1;
            }
        }
        disabled
    }
}
