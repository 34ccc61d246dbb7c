//! Core configuration.
//!
//! # Responsibility
//! - Hold tunables for reminders, week layout and logging.
//! - Parse them from JSON with per-field defaults.
//!
//! # Invariants
//! - A returned `CoreConfig` has passed `validate()`.

use crate::logging::default_log_level;
use crate::service::urgency_scanner::{
    KindVisibility, UrgencyScanner, VisibilityPolicy, DEFAULT_HORIZON_DAYS,
};
use crate::service::week_view::DEFAULT_DAYS_PER_WEEK;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const MAX_HORIZON_DAYS: u32 = 365;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Reminder window in days; deadlines up to `today + horizon_days` count.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Schedulable days per week, starting Monday.
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u32,
    #[serde(default = "default_project_visibility")]
    pub project_visibility: VisibilityPolicy,
    #[serde(default = "default_task_visibility")]
    pub task_visibility: VisibilityPolicy,
    #[serde(default = "default_level")]
    pub log_level: String,
}

fn default_horizon_days() -> u32 {
    DEFAULT_HORIZON_DAYS
}

fn default_days_per_week() -> u32 {
    DEFAULT_DAYS_PER_WEEK
}

fn default_project_visibility() -> VisibilityPolicy {
    KindVisibility::default().project
}

fn default_task_visibility() -> VisibilityPolicy {
    KindVisibility::default().task
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            days_per_week: default_days_per_week(),
            project_visibility: default_project_visibility(),
            task_visibility: default_task_visibility(),
            log_level: default_level(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=7).contains(&self.days_per_week) {
            return Err(ConfigError::Invalid(format!(
                "days_per_week must be within 1..=7, got {}",
                self.days_per_week
            )));
        }
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(ConfigError::Invalid(format!(
                "horizon_days must be <= {MAX_HORIZON_DAYS}, got {}",
                self.horizon_days
            )));
        }
        Ok(())
    }

    pub fn visibility(&self) -> KindVisibility {
        KindVisibility {
            project: self.project_visibility,
            task: self.task_visibility,
        }
    }

    pub fn urgency_scanner(&self) -> UrgencyScanner {
        UrgencyScanner::new(self.horizon_days, self.visibility())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::service::urgency_scanner::VisibilityPolicy;

    #[test]
    fn empty_document_takes_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.horizon_days, 7);
        assert_eq!(config.days_per_week, 6);
        assert_eq!(config.project_visibility, VisibilityPolicy::Everyone);
        assert_eq!(config.task_visibility, VisibilityPolicy::OwnerOrPrivileged);
    }

    #[test]
    fn overrides_are_applied_to_scanner() {
        let config = CoreConfig::from_json_str(
            r#"{"horizon_days": 3, "project_visibility": "owner_or_privileged"}"#,
        )
        .unwrap();
        let scanner = config.urgency_scanner();
        assert_eq!(scanner.horizon_days, 3);
        assert_eq!(
            scanner.visibility.project,
            VisibilityPolicy::OwnerOrPrivileged
        );
    }

    #[test]
    fn rejects_invalid_week_length_and_unknown_policy() {
        let err = CoreConfig::from_json_str(r#"{"days_per_week": 9}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = CoreConfig::from_json_str(r#"{"task_visibility": "nobody"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio.json");
        std::fs::write(&path, r#"{"horizon_days": 14}"#).unwrap();

        assert_eq!(CoreConfig::from_path(&path).unwrap().horizon_days, 14);
        assert!(matches!(
            CoreConfig::from_path(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
