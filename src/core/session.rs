//! Per-invocation context: workspace, role, and configuration

use std::path::Path;

use chrono::{Local, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::debug;

use crate::core::config::{Config, Thresholds};
use crate::core::records::RecordError;
use crate::core::role::Role;
use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Everything a command needs, passed explicitly instead of held globally
#[derive(Debug)]
pub struct Session {
    workspace: Workspace,
    role: Role,
    config: Config,
}

impl Session {
    /// Locate the workspace, resolve the role, and make sure every table exists
    ///
    /// Role precedence: explicit argument, then `SRP_ROLE`, then config, then OEM.
    pub fn open(data_dir: Option<&Path>, role: Option<&str>) -> Result<Self, SessionError> {
        let workspace = match data_dir {
            Some(dir) => Workspace::open(dir)?,
            None => Workspace::discover()?,
        };
        let config = Config::load(Some(workspace.data_dir()));
        let role = role
            .map(Role::new)
            .or_else(|| config.role.as_deref().map(Role::new))
            .unwrap_or_default();

        crate::entities::initialize_all(&workspace)?;
        debug!(data_dir = %workspace.data_dir().display(), role = %role, "session opened");

        Ok(Self {
            workspace,
            role,
            config,
        })
    }

    /// Build a session from parts; used by tests and `init`
    pub fn with(workspace: Workspace, role: Role, config: Config) -> Self {
        Self {
            workspace,
            role,
            config,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds()
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
