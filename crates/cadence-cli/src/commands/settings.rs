//! Settings command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cadence_core::settings::default_settings_path;
use cadence_core::Settings;

/// The settings file to use: `--settings` if given, else the platform default
pub fn settings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_settings_path()
            .context("No data directory on this platform; pass --settings <PATH>"),
    }
}

/// Load settings from `--settings` or the default location
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = settings_path(explicit)?;
    Settings::load_from(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

pub fn cmd_settings_show(explicit: Option<&Path>) -> Result<()> {
    let path = settings_path(explicit)?;
    let settings = load_settings(explicit)?;

    println!();
    println!("⚙️  Settings");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   notifications_enabled │ {}",
        settings.notifications.enabled
    );
    println!(
        "   reminder_days         │ {}",
        settings.notifications.reminder_days
    );
    println!("   dark_mode             │ {}", settings.display.dark_mode);
    println!(
        "   default_currency      │ {}",
        settings.display.default_currency
    );
    println!();
    if path.exists() {
        println!("   File: {}", path.display());
    } else {
        println!("   File: {} (not created, using defaults)", path.display());
    }

    Ok(())
}

pub fn cmd_settings_set(explicit: Option<&Path>, key: &str, value: &str) -> Result<Settings> {
    let path = settings_path(explicit)?;
    let mut settings = load_settings(explicit)?;

    settings.set(key, value)?;
    settings
        .save_to(&path)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    println!("✅ {} = {}", key, value);
    Ok(settings)
}

pub fn cmd_settings_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", settings_path(explicit)?.display());
    Ok(())
}
