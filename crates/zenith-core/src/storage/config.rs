//! TOML-based application configuration.
//!
//! Stores user preferences that are not part of the persisted session state:
//! - Pomodoro phase lengths
//! - Notification gate and lead window
//! - Log filter
//!
//! Configuration is stored at `~/.config/zenith/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, data_dir_path};
use crate::error::ConfigError;
use crate::notify::NotificationPermission;

/// Pomodoro phase lengths, in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_pomodoro_focus")]
    pub focus_minutes: u32,
    #[serde(default = "default_pomodoro_break")]
    pub break_minutes: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Host permission state. The CLI host has no prompt, so this stands in for it.
    #[serde(default = "default_permission")]
    pub permission: NotificationPermission,
    /// Upper bound of the lead window, in minutes before a schedule starts.
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive, overridden by `ZENITH_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/zenith/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_pomodoro_focus() -> u32 {
    25
}
fn default_pomodoro_break() -> u32 {
    5
}
fn default_true() -> bool {
    true
}
fn default_permission() -> NotificationPermission {
    NotificationPermission::Granted
}
fn default_lead_minutes() -> u32 {
    5
}
fn default_log_filter() -> String {
    "warn".into()
}

fn positive_or_default(key: &str, value: &mut u32, default: u32) {
    if *value == 0 {
        tracing::warn!(key, default, "zero minutes in config, using default");
        *value = default;
    }
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_pomodoro_focus(),
            break_minutes: default_pomodoro_break(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission: default_permission(),
            lead_minutes: default_lead_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl NotificationsConfig {
    /// Permission as seen by the notification scheduler. Disabling
    /// notifications behaves exactly like a denied permission.
    pub fn effective_permission(&self) -> NotificationPermission {
        if self.enabled {
            self.permission
        } else {
            NotificationPermission::Denied
        }
    }
}

impl Config {
    /// Check that every minute field is positive.
    ///
    /// # Errors
    /// Returns `InvalidValue` naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let minutes = [
            ("pomodoro.focus_minutes", self.pomodoro.focus_minutes),
            ("pomodoro.break_minutes", self.pomodoro.break_minutes),
            ("notifications.lead_minutes", self.notifications.lead_minutes),
        ];
        match minutes.iter().find(|(_, value)| *value == 0) {
            Some((key, _)) => Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                message: "must be at least 1 minute".into(),
            }),
            None => Ok(()),
        }
    }

    /// Replace zero minute fields with their defaults.
    pub fn sanitize(&mut self) {
        positive_or_default(
            "pomodoro.focus_minutes",
            &mut self.pomodoro.focus_minutes,
            default_pomodoro_focus(),
        );
        positive_or_default(
            "pomodoro.break_minutes",
            &mut self.pomodoro.break_minutes,
            default_pomodoro_break(),
        );
        positive_or_default(
            "notifications.lead_minutes",
            &mut self.notifications.lead_minutes,
            default_lead_minutes(),
        );
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Self =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                cfg.sanitize();
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not fit the
    /// field's type, or a minute field would become zero.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let candidate: Self =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }

    /// Read the config file at the default location if one exists. Never
    /// creates the data directory or writes a file.
    pub fn read_existing() -> Option<Self> {
        Self::read_from(&data_dir_path().join("config.toml"))
    }

    /// Read `path` if it exists. A missing or unparsable file gives `None`.
    pub fn read_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&content) {
            Ok(mut cfg) => {
                cfg.sanitize();
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable");
                None
            }
        }
    }
}
