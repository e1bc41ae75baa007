use anyhow::{Context, Result};
use clap::Parser;
use modelgen::{pipeline, report, Config};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Generate Go model structs from SQL `CREATE TABLE` migrations.
#[derive(Parser, Debug)]
#[command(name = "modelgen", version, about)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the migration files
    #[arg(long)]
    migrations: Option<PathBuf>,

    /// Glob for migration file names
    #[arg(long)]
    pattern: Option<String>,

    /// Destination directory for generated models
    #[arg(long)]
    output: Option<PathBuf>,

    /// Package name (defaults to the last segment of --output)
    #[arg(long)]
    package: Option<String>,

    /// Table to leave out (repeatable)
    #[arg(long = "skip", value_name = "TABLE")]
    skip: Vec<String>,

    /// Only generate these tables (repeatable)
    #[arg(long = "only", value_name = "TABLE")]
    only: Vec<String>,

    /// Render nullable columns as pointer types
    #[arg(long)]
    nullable_pointers: bool,

    /// Write a JSON diagnostics report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Parse and report without writing any files
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(dir) = self.migrations {
            config.migrations_dir = dir;
        }
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        if let Some(dir) = self.output {
            config.output_dir = dir;
        }
        if self.package.is_some() {
            config.package = self.package;
        }
        config.skip_tables.extend(self.skip);
        config.only_tables.extend(self.only);
        config.nullable_pointers |= self.nullable_pointers;
        if self.report.is_some() {
            config.report = self.report;
        }
        Ok((config, self.dry_run))
    }
}

fn main() -> Result<()> {
    // logs go to stderr; stdout carries the summary table
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (config, dry_run) = Args::parse().into_config()?;
    info!(
        migrations = %config.migrations_dir.display(),
        output = %config.output_dir.display(),
        dry_run,
        "Configuration"
    );

    let summary = pipeline::run(&config, dry_run).context("generating models")?;

    print!("{}", report::summary_table(&summary.databases));
    let failed = summary.failed_columns();
    if failed > 0 {
        warn!("{} column lines need manual follow-up", failed);
    }
    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        "all done"
    );
    Ok(())
}
