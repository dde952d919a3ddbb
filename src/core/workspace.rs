//! Workspace discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the data directory inside a workspace
pub const DATA_DIR: &str = "data";

/// Marker file identifying an initialized data directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Subdirectory holding uploaded blobs
pub const UPLOADS_DIR: &str = "uploaded_files";

/// Subdirectory reserved for per-supplier documents
pub const SUPPLIER_RECORDS_DIR: &str = "supplier_records";

/// A directory tree holding one set of SRP tables
#[derive(Debug, Clone)]
pub struct Workspace {
    data_dir: PathBuf,
}

impl Workspace {
    /// Find a workspace by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find a workspace by walking up from `start`
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        loop {
            let data_dir = current.join(DATA_DIR);
            if data_dir.join(CONFIG_FILE).is_file() {
                return Ok(Self { data_dir });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use an explicit data directory (it must already exist)
    pub fn open(data_dir: &Path) -> Result<Self, WorkspaceError> {
        if !data_dir.is_dir() {
            return Err(WorkspaceError::MissingDataDir(data_dir.to_path_buf()));
        }
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Create the directory layout under `root`; safe to run repeatedly
    ///
    /// Returns the workspace and whether it already existed.
    pub fn init(root: &Path) -> Result<(Self, bool), WorkspaceError> {
        Self::init_data_dir(&root.join(DATA_DIR))
    }

    /// Like [`Workspace::init`] but for an explicit data directory
    pub fn init_data_dir(data_dir: &Path) -> Result<(Self, bool), WorkspaceError> {
        let config_path = data_dir.join(CONFIG_FILE);
        let existed = config_path.is_file();

        for dir in [
            data_dir.to_path_buf(),
            data_dir.join(UPLOADS_DIR),
            data_dir.join(SUPPLIER_RECORDS_DIR),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::Io(e.to_string()))?;
        }

        if !existed {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        }

        Ok((
            Self {
                data_dir: data_dir.to_path_buf(),
            },
            existed,
        ))
    }

    fn default_config() -> &'static str {
        r#"# Zenova SRP workspace configuration

# Role used when --role is not given (OEM, Supplier A, Supplier B, Auditor)
# role: OEM

# Default output format (auto, table, json, csv, md, id)
# default_format: auto

# Dashboard thresholds
# thresholds:
#   idle_asset_days: 60
#   reject_rate_alert: 1.5
#   esg_score_min: 70
#   audit_horizon_days: 30
#   review_overdue_days: 365
#   otd_champion: 98.0
#   quality_star: 0.1
#   perfect_audit_score: 100
"#
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a table file inside the data directory
    pub fn table_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }
}

/// Errors that can occur locating or creating a workspace
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no SRP workspace found (searched from {searched_from:?}). Run 'srp init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("data directory {0:?} does not exist. Run 'srp init --data-dir <DIR>' to create it.")]
    MissingDataDir(PathBuf),

    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = tempdir().unwrap();
        let (ws, existed) = Workspace::init(tmp.path()).unwrap();

        assert!(!existed);
        assert!(ws.data_dir().is_dir());
        assert!(ws.config_path().is_file());
        assert!(ws.uploads_dir().is_dir());
        assert!(ws.data_dir().join(SUPPLIER_RECORDS_DIR).is_dir());
    }

    #[test]
    fn test_init_twice_keeps_config() {
        let tmp = tempdir().unwrap();
        let (ws, _) = Workspace::init(tmp.path()).unwrap();
        std::fs::write(ws.config_path(), "role: Auditor\n").unwrap();

        let (ws, existed) = Workspace::init(tmp.path()).unwrap();
        assert!(existed);
        assert_eq!(
            std::fs::read_to_string(ws.config_path()).unwrap(),
            "role: Auditor\n"
        );
    }

    #[test]
    fn test_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let nested = tmp.path().join("reports/2024");
        std::fs::create_dir_all(&nested).unwrap();

        let ws = Workspace::discover_from(&nested).unwrap();
        assert_eq!(
            ws.data_dir().canonicalize().unwrap(),
            tmp.path().join(DATA_DIR).canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_workspace() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_open_requires_existing_dir() {
        let tmp = tempdir().unwrap();
        let err = Workspace::open(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, WorkspaceError::MissingDataDir(_)));
        assert!(Workspace::open(tmp.path()).is_ok());
    }
}
