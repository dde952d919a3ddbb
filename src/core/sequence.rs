//! Persisted ID sequences
//!
//! Record IDs are a prefix plus a zero-padded number (`SUP0007`). The next
//! number for each prefix is kept in `.sequences.json` beside the tables, so
//! deleting rows never causes an ID to be handed out twice.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::table::Table;

/// Sequence file name within the data directory
pub const SEQUENCE_FILE: &str = ".sequences.json";

/// Digits in the numeric part of an ID
const ID_WIDTH: usize = 4;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("failed to save ID sequences to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Next-number counters keyed by ID prefix
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct IdSequences {
    next: BTreeMap<String, u64>,
    #[serde(skip)]
    path: PathBuf,
}

impl IdSequences {
    /// Load counters from a data directory, or start empty if absent/unreadable
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SEQUENCE_FILE);
        let mut sequences = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<IdSequences>(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt sequence file");
                IdSequences::default()
            }),
            Err(_) => IdSequences::default(),
        };
        sequences.path = path;
        sequences
    }

    pub fn save(&self) -> Result<(), SequenceError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SequenceError::Save {
                path: self.path.clone(),
                source: e.into(),
            })?;
        fs::write(&self.path, content).map_err(|e| SequenceError::Save {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Reserve the next ID for `prefix` without saving
    ///
    /// A prefix seen for the first time is seeded past the highest number
    /// already used in `table`'s `id_column`.
    pub fn reserve(&mut self, prefix: &str, table: &Table, id_column: &str) -> String {
        let seeded = highest_used(prefix, table, id_column) + 1;
        let slot = self.next.entry(prefix.to_string()).or_insert(seeded);
        // never go backwards behind IDs written by other tools
        if *slot < seeded {
            *slot = seeded;
        }
        let number = *slot;
        *slot += 1;
        debug!(prefix, number, "reserved id");
        format_id(prefix, number)
    }

    /// Reserve and persist the next ID
    pub fn next_id(&mut self, prefix: &str, table: &Table, id_column: &str) -> Result<String, SequenceError> {
        let id = self.reserve(prefix, table, id_column);
        self.save()?;
        Ok(id)
    }

    /// Peek at the next number for a prefix, if one has been recorded
    pub fn peek(&self, prefix: &str) -> Option<u64> {
        self.next.get(prefix).copied()
    }
}

/// `PREFIX` + number padded to four digits
pub fn format_id(prefix: &str, number: u64) -> String {
    format!("{}{:0width$}", prefix, number, width = ID_WIDTH)
}

/// Highest numeric suffix among IDs in `column` that start with `prefix`
fn highest_used(prefix: &str, table: &Table, column: &str) -> u64 {
    table
        .column_values(column)
        .into_iter()
        .filter_map(|v| {
            let s = v.to_string();
            s.strip_prefix(prefix)
                .and_then(|rest| rest.parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0)
}
