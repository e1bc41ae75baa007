// src/pipeline/mod.rs

use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::Config;
use crate::emit::{self, RenderedModel};
use crate::error::Result;
use crate::model::Database;
use crate::parse;
use crate::report;
use crate::select::Selection;

/// Outcome of one generator run.
#[derive(Debug)]
pub struct RunSummary {
    pub databases: Vec<Database>,
    pub written: Vec<PathBuf>,
    /// Original names of tables left out by selection.
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn failed_columns(&self) -> usize {
        self.databases
            .iter()
            .map(|db| db.failed_parse_columns.len())
            .sum()
    }
}

/// Discover, parse, select, render and (unless `dry_run`) write every model.
///
/// All migrations are parsed and all models rendered and staged before the
/// first file is renamed into place, so a hard failure leaves no output files.
#[instrument(level = "info", skip(config), fields(migrations = %config.migrations_dir.display()))]
pub fn run(config: &Config, dry_run: bool) -> Result<RunSummary> {
    config.validate()?;

    let paths = parse::find_migrations(&config.migrations_dir, &config.pattern)?;
    info!("{} migration files", paths.len());
    let mut databases = parse::load_databases(&paths)?;

    Selection::new(&config.skip_tables, &config.only_tables).apply(&mut databases);

    let package = config.package_name();
    let opts = config.synth_options();
    let rendered = databases
        .iter()
        .filter(|db| !db.disabled)
        .map(|db| emit::render_database(db, &package, opts))
        .collect::<Result<Vec<RenderedModel>>>()?;

    let skipped: Vec<String> = databases
        .iter()
        .filter(|db| db.disabled)
        .map(|db| db.table_names.original.clone())
        .collect();

    let written = if dry_run {
        info!("dry run; {} models rendered, nothing written", rendered.len());
        Vec::new()
    } else {
        let mut staged = rendered
            .iter()
            .map(|model| emit::stage_model(&config.output_dir, &model.file_name, &model.contents))
            .collect::<Result<Vec<_>>>()?;
        if let Some(report_path) = &config.report {
            staged.push(report::stage_json(report_path, &databases)?);
        }
        let mut written = emit::commit(staged)?;
        // the report, when present, was staged last
        written.truncate(rendered.len());
        for path in &written {
            info!("wrote {}", path.display());
        }
        if let Some(report_path) = &config.report {
            info!("wrote report {}", report_path.display());
        }
        written
    };

    Ok(RunSummary {
        databases,
        written,
        skipped,
    })
}
