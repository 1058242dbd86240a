//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `export` - CSV export, JSON backup and restore
//! - `payments` - Payment history, billing catch-up and demo data
//! - `remind` - Payment reminders, one-shot or as a daemon
//! - `reports` - Analytics, spending series and upcoming payments
//! - `settings` - User settings commands
//! - `status` - Database status
//! - `subscriptions` - Subscription management commands

pub mod core;
pub mod export;
pub mod payments;
pub mod remind;
pub mod reports;
pub mod settings;
pub mod status;
pub mod subscriptions;

// Re-export command functions for main.rs
pub use self::core::*;
pub use export::*;
pub use payments::*;
pub use remind::*;
pub use reports::*;
pub use settings::*;
pub use status::*;
pub use subscriptions::*;

use anyhow::{Context, Result};
use cadence_core::db::Database;
use cadence_core::models::Subscription;
use chrono::NaiveDate;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse an optional YYYY-MM-DD argument, defaulting to `fallback`
pub fn parse_date_arg(value: Option<&str>, flag: &str, fallback: NaiveDate) -> Result<NaiveDate> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid --{} format (use YYYY-MM-DD)", flag))
        .map(|d| d.unwrap_or(fallback))
}

/// Find a subscription by exact ID, or by case-insensitive name
///
/// A name that matches more than one subscription is an error.
pub fn find_subscription(db: &Database, name_or_id: &str) -> Result<Subscription> {
    if let Some(sub) = db.get_subscription(name_or_id)? {
        return Ok(sub);
    }

    let needle = name_or_id.trim().to_lowercase();
    let mut matches: Vec<Subscription> = db
        .list_all_subscriptions()?
        .into_iter()
        .filter(|s| s.name.to_lowercase() == needle)
        .collect();

    match matches.len() {
        0 => anyhow::bail!("Subscription not found: {}", name_or_id),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!(
            "{} subscriptions are named '{}'; use the ID instead",
            n,
            name_or_id
        ),
    }
}
