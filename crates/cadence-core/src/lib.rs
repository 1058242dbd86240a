//! Cadence Core Library
//!
//! Shared functionality for the Cadence subscription tracker:
//! - Billing normalizer (monthly / yearly / daily equivalents, next billing date)
//! - Period bucketer and spending trend classifier
//! - Analytics aggregator over a pluggable store
//! - Encrypted SQLite storage with change notifications
//! - Subscription management, reminders, settings, export and backup

pub mod analytics;
pub mod billing;
pub mod buckets;
pub mod db;
pub mod demo;
pub mod error;
pub mod export;
pub mod filter;
pub mod manager;
pub mod models;
pub mod reminders;
pub mod settings;
pub mod store;
pub mod trend;

pub use analytics::{compute_analytics, spending_by_period, upcoming_payments};
pub use billing::CalculationBreakdown;
pub use db::{ActiveSubscriptionsWatch, Database};
pub use error::{Error, Result};
pub use export::{BackupMetadata, FullBackup, ImportStats};
pub use filter::{FilteredSubscriptions, SubscriptionFilter};
pub use manager::SubscriptionManager;
pub use reminders::{build_reminders, Reminder, ReminderKind};
pub use settings::Settings;
pub use store::SubscriptionStore;
