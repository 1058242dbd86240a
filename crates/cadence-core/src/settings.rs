//! User preferences
//!
//! ## Configuration Resolution
//!
//! Settings are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/cadence/config/settings.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Missing keys in an override file take their default value.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::DEFAULT_CURRENCY;

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../../../config/settings.toml");

/// Upper bound for `reminder_days`
pub const MAX_REMINDER_DAYS: i64 = 30;

/// Resolved user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    /// Days ahead the reminder check looks
    pub reminder_days: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_days: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub dark_mode: bool,
    pub default_currency: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        parse_settings(DEFAULT_SETTINGS).unwrap_or_else(|_| Self {
            notifications: NotificationSettings::default(),
            display: DisplaySettings::default(),
        })
    }
}

impl Settings {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        match default_settings_path() {
            Some(path) => Self::load_from(&path),
            None => parse_settings(DEFAULT_SETTINGS),
        }
    }

    /// Load from an explicit override path, falling back to embedded defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!(path = %path.display(), "Loading settings override");
            let content = fs::read_to_string(path)?;
            parse_settings(&content)
        } else {
            parse_settings(DEFAULT_SETTINGS)
        }
    }

    /// Write settings to `path`, creating parent directories
    ///
    /// Writes to a temp file in the same directory and renames it into place.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Set one value by key, e.g. `reminder_days` = `5`
    ///
    /// Leaves the settings unchanged when the new value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        next.apply(key, value)?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "notifications_enabled" | "notifications.enabled" => {
                self.notifications.enabled = parse_bool(key, value)?;
            }
            "reminder_days" | "notifications.reminder_days" => {
                self.notifications.reminder_days = value
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("{} must be a whole number", key)))?;
            }
            "dark_mode" | "display.dark_mode" => {
                self.display.dark_mode = parse_bool(key, value)?;
            }
            "default_currency" | "display.default_currency" => {
                self.display.default_currency = value.trim().to_uppercase();
            }
            _ => {
                return Err(Error::Config(format!(
                    "Unknown setting: {} (valid: notifications_enabled, reminder_days, dark_mode, default_currency)",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_REMINDER_DAYS).contains(&self.notifications.reminder_days) {
            return Err(Error::Config(format!(
                "reminder_days must be between 0 and {}, got {}",
                MAX_REMINDER_DAYS, self.notifications.reminder_days
            )));
        }
        let currency = &self.display.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Config(format!(
                "default_currency must be a three-letter code, got '{}'",
                currency
            )));
        }
        Ok(())
    }
}

/// Default settings override path
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cadence").join("config").join("settings.toml"))
}

/// Parse settings from TOML content
fn parse_settings(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content)?;
    settings.validate()?;
    Ok(settings)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::Config(format!("{} must be true or false", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_settings() {
        let settings = parse_settings(DEFAULT_SETTINGS).unwrap();
        assert!(settings.notifications.enabled);
        assert_eq!(settings.notifications.reminder_days, 3);
        assert!(!settings.display.dark_mode);
        assert_eq!(settings.display.default_currency, "USD");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings = parse_settings("[notifications]\nreminder_days = 7\n").unwrap();
        assert_eq!(settings.notifications.reminder_days, 7);
        assert!(settings.notifications.enabled);
        assert_eq!(settings.display.default_currency, "USD");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            parse_settings("[notifications]\nreminder_days = 90\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_settings("[notifications\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_set_by_key() {
        let mut settings = Settings::default();
        settings.set("notifications_enabled", "off").unwrap();
        settings.set("reminder_days", "10").unwrap();
        settings.set("display.default_currency", "eur").unwrap();
        assert!(!settings.notifications.enabled);
        assert_eq!(settings.notifications.reminder_days, 10);
        assert_eq!(settings.display.default_currency, "EUR");

        assert!(settings.set("reminder_days", "-1").is_err());
        assert_eq!(settings.notifications.reminder_days, 10);
        assert!(settings.set("dark_mode", "maybe").is_err());
        assert!(settings.set("theme", "dark").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        // Missing file falls back to defaults
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.set("dark_mode", "true").unwrap();
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert!(reloaded.display.dark_mode);
        assert_eq!(reloaded, settings);
    }
}
