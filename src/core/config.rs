//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// SRP configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Role used when `--role` is absent
    pub role: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Dashboard rule thresholds
    pub thresholds: Option<Thresholds>,
}

/// Cut-offs used by the dashboard rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Operational assets inactive longer than this are idle
    pub idle_asset_days: i64,
    /// Reject rate (%) above which a supplier is flagged
    pub reject_rate_alert: f64,
    /// ESG compliance score below which a supplier is flagged
    pub esg_score_min: f64,
    /// Open audits due within this many days are upcoming
    pub audit_horizon_days: i64,
    /// Performance reviews older than this are overdue
    pub review_overdue_days: i64,
    pub otd_champion: f64,
    pub quality_star: f64,
    pub perfect_audit_score: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            idle_asset_days: 60,
            reject_rate_alert: 1.5,
            esg_score_min: 70.0,
            audit_horizon_days: 30,
            review_overdue_days: 365,
            otd_champion: 98.0,
            quality_star: 0.1,
            perfect_audit_score: 100.0,
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(data_dir: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/zenova-srp/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 2. Workspace config (data/config.yaml)
        if let Some(dir) = data_dir {
            if let Some(local) = Self::read(&dir.join(crate::core::workspace::CONFIG_FILE)) {
                config.merge(local);
            }
        }

        // 3. Environment variables
        if let Ok(role) = std::env::var("SRP_ROLE") {
            if !role.trim().is_empty() {
                config.role = Some(role);
            }
        }

        config
    }

    /// Parse one config file; a missing file is silent, a broken one warns
    fn read(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "zenova-srp")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.role.is_some() {
            self.role = other.role;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.thresholds.is_some() {
            self.thresholds = other.thresholds;
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds.clone().unwrap_or_default()
    }
}
