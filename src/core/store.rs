//! Whole-file CSV persistence for entity tables
//!
//! Every table lives in one CSV file whose header is its current schema.
//! Mutations follow a load, mutate, rewrite cycle over the entire file:
//!
//! - [`initialize`] writes an empty header-only file when none exists
//! - [`load`] reads the file, adding any expected column that is missing
//! - [`append`] rewrites the file with new rows after the existing ones
//! - [`overwrite`] replaces the file with a given table
//!
//! There is no locking. Two processes appending or rewriting the same file
//! race, and the last writer wins; callers needing multi-writer safety must
//! move to row-addressable storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::table::{Table, Value};

/// Errors raised by the store; only real I/O failures surface here
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn read(path: &Path, source: impl Into<io::Error>) -> Self {
        StoreError::Read {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub fn write(path: &Path, source: impl Into<io::Error>) -> Self {
        StoreError::Write {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

fn is_missing_or_empty(path: &Path) -> Result<bool, StoreError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(StoreError::read(path, e)),
    }
}

/// Write an empty table with `columns` if the file is missing or zero-length
///
/// Never touches a file that already has content.
pub fn initialize<S: AsRef<str>>(path: &Path, columns: &[S]) -> Result<(), StoreError> {
    if is_missing_or_empty(path)? {
        debug!(path = %path.display(), "initializing table file");
        overwrite(path, &Table::new(columns))?;
    }
    Ok(())
}

/// Load a table, guaranteeing every name in `columns` is present
///
/// Missing or empty files, and content that cannot be parsed, yield an empty
/// table shaped by `columns`. Extra columns found in the file are kept.
pub fn load<S: AsRef<str>>(path: &Path, columns: &[S]) -> Result<Table, StoreError> {
    if is_missing_or_empty(path)? {
        return Ok(Table::new(columns));
    }

    let file = fs::File::open(path).map_err(|e| StoreError::read(path, e))?;
    let mut table = match parse(file) {
        Ok(Some(table)) => table,
        Ok(None) => return Ok(Table::new(columns)),
        Err(e) => match e.into_kind() {
            csv::ErrorKind::Io(io_err) => return Err(StoreError::read(path, io_err)),
            kind => {
                warn!(
                    path = %path.display(),
                    error = ?kind,
                    "unparsable table file, treating as empty"
                );
                return Ok(Table::new(columns));
            }
        },
    };

    for column in columns {
        table.ensure_column(column.as_ref());
    }
    debug!(path = %path.display(), rows = table.len(), "loaded table");
    Ok(table)
}

/// Parse CSV content; `None` when there is no usable header
fn parse<R: io::Read>(reader: R) -> Result<Option<Table>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Ok(None);
    }
    let mut table = Table::new(&headers.iter().collect::<Vec<_>>());
    if table.columns().len() != headers.len() {
        // duplicate header names cannot be addressed by name
        return Ok(None);
    }

    for record in rdr.records() {
        let record = record?;
        table.push_values(record.iter().map(Value::parse).collect());
    }
    Ok(Some(table))
}

/// Append `new_rows` after the existing rows and rewrite the whole file
///
/// The file is re-shaped to the union of its columns and the incoming ones;
/// earlier rows read null for newly introduced columns.
pub fn append(path: &Path, new_rows: &Table) -> Result<(), StoreError> {
    let existing = load(path, new_rows.columns())?;
    let combined = existing.concat(new_rows);
    debug!(
        path = %path.display(),
        appended = new_rows.len(),
        total = combined.len(),
        "appending rows"
    );
    overwrite(path, &combined)
}

/// Replace the file with exactly `table`
pub fn overwrite(path: &Path, table: &Table) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::write(path, e))?;
        }
    }

    let mut wtr = csv::Writer::from_path(path).map_err(|e| StoreError::write(path, e))?;
    wtr.write_record(table.columns())
        .map_err(|e| StoreError::write(path, e))?;
    for row in table.rows() {
        wtr.write_record(row.values().iter().map(|v| v.to_string()))
            .map_err(|e| StoreError::write(path, e))?;
    }
    wtr.flush().map_err(|e| StoreError::write(path, e))?;
    debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}
