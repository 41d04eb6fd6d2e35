use crate::notify::LeadTimes;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Env var overriding the config file location.
pub const CONFIG_ENV: &str = "ORGANIZER_CONFIG";
/// Env var overriding the database location.
pub const DB_ENV: &str = "ORGANIZER_DB";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether the user granted reminder delivery.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub day_before: bool,
    #[serde(default = "default_true")]
    pub day_of: bool,
    #[serde(default = "default_true")]
    pub two_hours: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            day_before: default_true(),
            day_of: default_true(),
            two_hours: default_true(),
        }
    }
}

impl NotificationConfig {
    #[must_use]
    pub const fn lead_times(&self) -> LeadTimes {
        LeadTimes {
            day_before: self.day_before,
            day_of: self.day_of,
            two_hours: self.two_hours,
        }
    }

    pub fn set_lead_times(&mut self, lead: LeadTimes) {
        self.day_before = lead.day_before;
        self.day_of = lead.day_of;
        self.two_hours = lead.two_hours;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between store polls in `org watch`.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
        }
    }
}

/// Location of the user config file: `ORGANIZER_CONFIG`, else
/// `<config_dir>/organizer/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("organizer/config.toml"))
}

/// Load the config at `path`, falling back to defaults when no file exists.
///
/// # Errors
///
/// Returns an error if the file exists but can't be read or parsed.
pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `config` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_config_to(path: &Path, config: &UserConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Resolve the database path.
///
/// Precedence: explicit flag > `ORGANIZER_DB` > config `db_path` >
/// `<data_dir>/organizer/organizer.db` > `./organizer.db`.
#[must_use]
pub fn resolve_db_path(flag: Option<&Path>, config: &UserConfig) -> PathBuf {
    let env_path = env::var_os(DB_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_db_path_inner(flag, env_path, config, dirs::data_dir())
}

fn resolve_db_path_inner(
    flag: Option<&Path>,
    env_path: Option<PathBuf>,
    config: &UserConfig,
    data_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env_path {
        return path;
    }
    if let Some(path) = &config.db_path {
        return path.clone();
    }
    data_dir.map_or_else(
        || PathBuf::from("organizer.db"),
        |dir| dir.join("organizer/organizer.db"),
    )
}

const fn default_true() -> bool {
    true
}

const fn default_poll_secs() -> u64 {
    30
}
