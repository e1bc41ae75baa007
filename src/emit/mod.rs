// src/emit/mod.rs

pub mod template;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{GenError, Result};
use crate::model::Database;
use crate::synth::{self, CustomType, Field, SynthOptions};
pub use template::ModelFile;

pub const EXTENSION: &str = "go";
const FALLBACK_PACKAGE: &str = "models";

/// `<table>_model.go`
pub fn file_name(table_original_name: &str) -> String {
    format!("{}_model.{}", table_original_name, EXTENSION)
}

/// Package name derived from the last segment of the destination directory.
pub fn package_name<P: AsRef<Path>>(dest: P) -> String {
    let segment = dest
        .as_ref()
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        FALLBACK_PACKAGE.to_string()
    } else {
        cleaned
    }
}

/// A model file rendered in memory, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModel {
    pub table: String,
    pub file_name: String,
    pub contents: String,
}

/// Synthesize and render one table.
pub fn render_database(db: &Database, package: &str, opts: SynthOptions) -> Result<RenderedModel> {
    let (fields, custom_types) = synth::synthesize_with(&db.table_names.camel_case, &db.columns, opts);
    let contents = ModelFile {
        table: &db.table_names.original,
        package,
        model_name: &db.table_names.camel_case,
        needs_time: synth::needs_time_import(&fields),
        fields: &fields,
        custom_types: &custom_types,
    }
    .render()?;

    Ok(RenderedModel {
        table: db.table_names.original.clone(),
        file_name: file_name(&db.table_names.original),
        contents,
    })
}

/// Render and write `<table>_model.go` under `dest`, returning the written path.
#[instrument(level = "debug", skip_all, fields(table = table_original_name, dest = %dest.as_ref().display()))]
pub fn emit<P: AsRef<Path>>(
    table_original_name: &str,
    package: &str,
    model_name: &str,
    fields: &[Field],
    custom_types: &[CustomType],
    needs_time: bool,
    dest: P,
) -> Result<PathBuf> {
    let contents = ModelFile {
        table: table_original_name,
        package,
        model_name,
        fields,
        custom_types,
        needs_time,
    }
    .render()?;
    write_model(dest, &file_name(table_original_name), &contents)
}

/// Write rendered source into `dest/file_name`.
pub fn write_model<P: AsRef<Path>>(dest: P, file_name: &str, contents: &str) -> Result<PathBuf> {
    let path = dest.as_ref().join(file_name);
    write_atomic(&path, contents.as_bytes())?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// Write to a temp file beside `path`, then rename over it, so readers never
/// observe a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    commit(vec![stage(path, bytes)?])?;
    Ok(())
}

/// Contents fully written to a temp file beside its target, not yet renamed
/// into place. Dropping it removes the temp file.
#[derive(Debug)]
pub struct Staged {
    tmp: NamedTempFile,
    path: PathBuf,
}

/// Stage `dest/file_name` for a later [`commit`].
pub fn stage_model<P: AsRef<Path>>(dest: P, file_name: &str, contents: &str) -> Result<Staged> {
    stage(&dest.as_ref().join(file_name), contents.as_bytes())
}

/// Write `bytes` to a temp file in the directory of `path`.
pub fn stage(path: &Path, bytes: &[u8]) -> Result<Staged> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| GenError::write(&dir, e))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| GenError::write(&dir, e))?;
    tmp.write_all(bytes).map_err(|e| GenError::write(path, e))?;
    tmp.flush().map_err(|e| GenError::write(path, e))?;
    debug!(bytes = bytes.len(), "staged {}", path.display());
    Ok(Staged {
        tmp,
        path: path.to_path_buf(),
    })
}

/// Rename every staged file into place, in order.
///
/// If one rename fails, the files already renamed by this call are removed
/// and the remaining temp files are dropped, so either every target is
/// written or none is.
pub fn commit(staged: Vec<Staged>) -> Result<Vec<PathBuf>> {
    let mut done: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for Staged { tmp, path } in staged {
        if let Err(e) = tmp.persist(&path) {
            warn!(
                rolled_back = done.len(),
                "could not persist {}, removing files written so far",
                path.display()
            );
            for written in &done {
                if let Err(rm) = fs::remove_file(written) {
                    warn!("could not remove {}: {}", written.display(), rm);
                }
            }
            return Err(GenError::write(&path, e.error));
        }
        debug!("persisted {}", path.display());
        done.push(path);
    }
    Ok(done)
}
