//! Create, read, update, and delete for any [`Record`] type
//!
//! Every mutation is a whole-file rewrite through [`crate::core::store`].
//! Validation runs before anything touches disk.

use std::marker::PhantomData;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::entity::{Record, ValidationError};
use crate::core::role::Role;
use crate::core::sequence::{IdSequences, SequenceError};
use crate::core::store::{self, StoreError};
use crate::core::table::{Table, Value};
use crate::core::workspace::Workspace;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Table-backed collection of one record type
pub struct Records<'a, R> {
    workspace: &'a Workspace,
    _record: PhantomData<R>,
}

impl<'a, R: Record> Records<'a, R> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.workspace.table_path(R::FILE)
    }

    /// Write the header if the file is missing or empty
    pub fn initialize(&self) -> Result<(), RecordError> {
        store::initialize(&self.path(), R::COLUMNS)?;
        Ok(())
    }

    /// Load the raw table, shaped to the record's columns
    pub fn table(&self) -> Result<Table, RecordError> {
        Ok(store::load(&self.path(), R::COLUMNS)?)
    }

    /// The rows visible to `role`
    pub fn table_for(&self, role: &Role) -> Result<Table, RecordError> {
        let table = self.table()?;
        Ok(scope_to(table, R::OWNER_COLUMN, role))
    }

    pub fn list(&self) -> Result<Vec<R>, RecordError> {
        Ok(self.table()?.rows().map(|row| R::from_row(&row)).collect())
    }

    pub fn get(&self, id: &str) -> Result<R, RecordError> {
        let table = self.table()?;
        let index = table
            .position(R::ID_COLUMN, id)
            .ok_or_else(|| not_found::<R>(id))?;
        let row = table.row(index).ok_or_else(|| not_found::<R>(id))?;
        Ok(R::from_row(&row))
    }

    /// Validate, assign an ID when the type generates one, and append
    pub fn create(&self, mut record: R) -> Result<R, RecordError> {
        record.validate()?;

        let table = self.table()?;
        if let Some(prefix) = R::ID_PREFIX {
            let mut sequences = IdSequences::load(self.workspace.data_dir());
            let id = sequences.next_id(prefix, &table, R::ID_COLUMN)?;
            record.assign_id(id);
        } else if table.position(R::ID_COLUMN, record.id()).is_some() {
            return Err(RecordError::Duplicate {
                kind: R::KIND,
                id: record.id().to_string(),
            });
        }

        store::append(&self.path(), &Table::from_rows([record.to_row()]))?;
        info!(kind = R::KIND, id = record.id(), "created");
        Ok(record)
    }

    /// Write the fields of `record` that differ from the stored row
    ///
    /// Cells whose typed value is unchanged keep their stored text, so an
    /// edit never rewrites a legacy cell the caller did not touch.
    pub fn update(&self, record: &R) -> Result<(), RecordError> {
        record.validate()?;

        let mut table = self.table()?;
        let index = table
            .position(R::ID_COLUMN, record.id())
            .ok_or_else(|| not_found::<R>(record.id()))?;
        let stored = table
            .row(index)
            .map(|row| R::from_row(&row).to_row())
            .ok_or_else(|| not_found::<R>(record.id()))?;

        let changed: Vec<(String, Value)> = record
            .to_row()
            .iter()
            .filter(|(name, value)| stored.get(name) != Some(*value))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        if changed.is_empty() {
            debug!(kind = R::KIND, id = record.id(), "nothing to update");
            return Ok(());
        }
        for (name, value) in changed {
            table.set_cell(index, &name, value);
        }
        store::overwrite(&self.path(), &table)?;
        info!(kind = R::KIND, id = record.id(), "updated");
        Ok(())
    }

    /// Remove the row with `id`, returning what was removed
    pub fn delete(&self, id: &str) -> Result<R, RecordError> {
        let mut table = self.table()?;
        let index = table
            .position(R::ID_COLUMN, id)
            .ok_or_else(|| not_found::<R>(id))?;
        let removed = table
            .row(index)
            .map(|row| R::from_row(&row))
            .ok_or_else(|| not_found::<R>(id))?;
        table.remove_where(R::ID_COLUMN, id);
        store::overwrite(&self.path(), &table)?;
        info!(kind = R::KIND, id, "deleted");
        Ok(removed)
    }

    /// Remove every row whose `column` equals `value`
    pub fn delete_where(&self, column: &str, value: &str) -> Result<usize, RecordError> {
        let mut table = self.table()?;
        let removed = table.remove_where(column, value);
        if removed > 0 {
            store::overwrite(&self.path(), &table)?;
        }
        debug!(kind = R::KIND, column, value, removed, "bulk delete");
        Ok(removed)
    }
}

fn not_found<R: Record>(id: &str) -> RecordError {
    RecordError::NotFound {
        kind: R::KIND,
        id: id.to_string(),
    }
}

/// Keep only rows owned by `role`, unless the role sees everything
pub fn scope_to(table: Table, owner_column: Option<&str>, role: &Role) -> Table {
    match owner_column {
        Some(column) if !role.sees_everything() => {
            table.filter(|row| row.text(column) == role.as_str())
        }
        _ => table,
    }
}
