//! Run configuration: YAML file plus command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::emit;
use crate::error::{GenError, Result};
use crate::synth::SynthOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the migration files.
    pub migrations_dir: PathBuf,

    /// Glob matched against file names inside `migrations_dir`.
    pub pattern: String,

    /// Where generated models are written.
    pub output_dir: PathBuf,

    /// Package clause for generated files; derived from `output_dir` when unset.
    pub package: Option<String>,

    pub skip_tables: Vec<String>,

    /// When non-empty, only these tables are emitted.
    pub only_tables: Vec<String>,

    pub nullable_pointers: bool,

    /// Optional JSON diagnostics report path.
    pub report: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("db/migrations"),
            pattern: "*.sql".to_string(),
            output_dir: PathBuf::from("models"),
            package: None,
            skip_tables: Vec::new(),
            only_tables: Vec::new(),
            nullable_pointers: false,
            report: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GenError::read(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(GenError::Config("pattern must not be empty".into()));
        }
        if let Some(package) = &self.package {
            if !is_go_identifier(package) {
                return Err(GenError::Config(format!(
                    "package `{}` is not a valid Go identifier",
                    package
                )));
            }
        }
        if let Some(both) = self
            .skip_tables
            .iter()
            .find(|t| self.only_tables.iter().any(|o| o.eq_ignore_ascii_case(t)))
        {
            return Err(GenError::Config(format!(
                "table `{}` is both skipped and selected",
                both
            )));
        }
        Ok(())
    }

    pub fn package_name(&self) -> String {
        self.package
            .clone()
            .unwrap_or_else(|| emit::package_name(&self.output_dir))
    }

    pub fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            nullable_pointers: self.nullable_pointers,
        }
    }
}

fn is_go_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
