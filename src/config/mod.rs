use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What the catalog does when an edit or a deletion would leave existing
/// reservations pointing at a slot the event no longer offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_capacity")]
    pub default_capacity: u32,
    #[serde(default = "default_quota")]
    pub default_quota: u32,
    #[serde(default = "default_times")]
    pub default_times: Vec<String>,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_admission_retries")]
    pub admission_retries: u32,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
    #[serde(default = "default_reminder_interval")]
    pub reminder_interval_secs: u64,
    #[serde(default = "default_activation_poll")]
    pub activation_poll_secs: u64,
}

fn default_capacity() -> u32 {
    45
}
fn default_quota() -> u32 {
    4
}
fn default_times() -> Vec<String> {
    vec!["9:00".to_string(), "12:00".to_string()]
}
fn default_busy_timeout() -> u64 {
    5000
}
fn default_admission_retries() -> u32 {
    5
}
fn default_reminder_interval() -> u64 {
    3600
}
fn default_activation_poll() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    /// Defaults pointing at an explicit database file.
    pub fn with_database(path: impl AsRef<Path>) -> Self {
        Self {
            database: path.as_ref().to_string_lossy().to_string(),
            default_capacity: default_capacity(),
            default_quota: default_quota(),
            default_times: default_times(),
            busy_timeout_ms: default_busy_timeout(),
            admission_retries: default_admission_retries(),
            orphan_policy: OrphanPolicy::default(),
            reminder_interval_secs: default_reminder_interval(),
            activation_poll_secs: default_activation_poll(),
        }
    }

    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".examslot")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("examslot.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("examslot.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Create the config directory, the config file (unless `is_test`) and an
    /// empty database file. Returns the database path written to the config.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => crate::utils::path::expand_tilde(name),
            None => Self::database_file(),
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&Self::with_database(&db_path))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}
