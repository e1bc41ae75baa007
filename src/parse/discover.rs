// src/parse/discover.rs

use glob::{glob, Pattern};
use rayon::prelude::*;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use super::ddl::parse;
use crate::error::{GenError, Result};
use crate::model::Database;

/// Every file in `dir` matching `pattern` (e.g. `*.sql`), sorted by path.
#[instrument(level = "debug", skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn find_migrations<P: AsRef<Path>>(dir: P, pattern: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let full = format!(
        "{}/{}",
        Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let mut paths = Vec::new();
    for entry in glob(&full)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            GenError::read(path, e.into())
        })?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        debug!(pattern = %full, "No migration files found");
        return Err(GenError::NoMigrations(dir.display().to_string()));
    }
    debug!(count = paths.len(), "Found migration files");
    Ok(paths)
}

/// Read and parse a single migration file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Database> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| GenError::read(path, e))?;
    parse(&bytes).map_err(|e| match e {
        GenError::TableNameNotFound(_) => GenError::TableNameNotFound(path.display().to_string()),
        other => other,
    })
}

/// Parse every migration, keeping input order. The first hard failure wins.
///
/// Two files creating the same table (case-insensitively) would render to the
/// same model file, so that is a hard failure too.
pub fn load_databases(paths: &[PathBuf]) -> Result<Vec<Database>> {
    let databases = paths
        .par_iter()
        .map(|path| parse_file(path))
        .collect::<Result<Vec<_>>>()?;

    if databases.is_empty() {
        return Err(GenError::NoMigrations("<no files>".to_string()));
    }
    reject_duplicate_tables(paths, &databases)?;
    info!("parsed {} migrations", databases.len());
    Ok(databases)
}

fn reject_duplicate_tables(paths: &[PathBuf], databases: &[Database]) -> Result<()> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::with_capacity(databases.len());
    for (path, db) in paths.iter().zip(databases) {
        let key = db.table_names.original.to_lowercase();
        if let Some(first) = seen.insert(key, path) {
            return Err(GenError::DuplicateTable {
                table: db.table_names.original.clone(),
                first: first.clone(),
                second: path.clone(),
            });
        }
    }
    Ok(())
}

/// [`find_migrations`] followed by [`load_databases`].
pub fn load_migrations<P: AsRef<Path>>(dir: P, pattern: &str) -> Result<Vec<Database>> {
    let paths = find_migrations(&dir, pattern)?;
    load_databases(&paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn finds_only_matching_files_in_order() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "002_orders.sql", "CREATE TABLE orders (\n id int\n);");
        write(tmp.path(), "001_users.sql", "CREATE TABLE users (\n id int\n);");
        write(tmp.path(), "README.md", "not a migration");

        let paths = find_migrations(tmp.path(), "*.sql").unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["001_users.sql", "002_orders.sql"]);

        let dbs = load_databases(&paths).unwrap();
        assert_eq!(dbs[0].table_names.original, "users");
        assert_eq!(dbs[1].table_names.original, "orders");
    }

    #[test]
    fn empty_directory_has_no_migrations() {
        let tmp = tempdir().unwrap();
        let err = load_migrations(tmp.path(), "*.sql").unwrap_err();
        assert!(matches!(err, GenError::NoMigrations(_)));
        assert!(matches!(
            load_databases(&[]).unwrap_err(),
            GenError::NoMigrations(_)
        ));
    }

    #[test]
    fn table_name_failure_names_the_file() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "001_users.sql", "CREATE TABLE users (\n id int\n);");
        write(tmp.path(), "002_alter.sql", "ALTER TABLE users ADD age int;");

        let err = load_migrations(tmp.path(), "*.sql").unwrap_err();
        match err {
            GenError::TableNameNotFound(origin) => assert!(origin.ends_with("002_alter.sql")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let tmp = tempdir().unwrap();
        let err = parse_file(tmp.path().join("missing.sql")).unwrap_err();
        assert!(matches!(err, GenError::Read { .. }));
    }

    #[test]
    fn same_table_in_two_files_is_rejected() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "001.sql", "CREATE TABLE users (\n id int,\n email text\n);");
        write(tmp.path(), "002.sql", "CREATE TABLE USERS (\n id int\n);");

        match load_migrations(tmp.path(), "*.sql").unwrap_err() {
            GenError::DuplicateTable {
                table,
                first,
                second,
            } => {
                assert_eq!(table, "USERS");
                assert!(first.ends_with("001.sql"));
                assert!(second.ends_with("002.sql"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
