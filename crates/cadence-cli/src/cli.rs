//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Cadence - Track recurring subscriptions and what they really cost
#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Offline subscription and recurring payment tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "cadence.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for real data)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set CADENCE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Settings file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status (encryption, size, counts)
    Status,

    /// Manage subscriptions (list, add, edit, show, pause, resume, delete)
    Subscriptions {
        #[command(subcommand)]
        action: Option<SubscriptionsAction>,
    },

    /// Payment history and billing (history, record, bill, seed-demo, clear)
    Payments {
        #[command(subcommand)]
        action: Option<PaymentsAction>,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report: ReportType,
    },

    /// Show payment reminders
    Remind {
        /// Keep running and re-check on a schedule and whenever subscriptions change
        ///
        /// Interval is set with CADENCE_REMINDER_INTERVAL_HOURS (default: 24).
        #[arg(long)]
        daemon: bool,
    },

    /// View or change user settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Export data
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },

    /// Restore from a JSON backup
    ImportBackup {
        /// Backup file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Remove existing subscriptions and payments first
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionsAction {
    /// List subscriptions (active only unless --all)
    List(ListArgs),

    /// Add a subscription
    Add(AddArgs),

    /// Edit a subscription
    Edit(EditArgs),

    /// Show details and cost breakdown
    Show {
        /// Subscription name or ID
        name_or_id: String,
    },

    /// Pause a subscription (excluded from totals and reminders)
    Pause {
        /// Subscription name or ID
        name_or_id: String,
    },

    /// Resume a paused subscription
    Resume {
        /// Subscription name or ID
        name_or_id: String,
    },

    /// Delete a subscription (payment history is kept)
    Delete {
        /// Subscription name or ID
        name_or_id: String,
    },
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Include paused subscriptions
    #[arg(long)]
    pub all: bool,

    /// Filter by name (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by interval: weekly, monthly, quarterly, yearly, custom
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Filter by category (repeatable)
    #[arg(short, long)]
    pub category: Vec<String>,

    /// Minimum price
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<f64>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Display name
    pub name: String,

    /// Price per billing period
    pub price: f64,

    /// Billing interval: weekly, monthly, quarterly, yearly, custom
    #[arg(short, long, default_value = "monthly")]
    pub interval: String,

    /// Days per period (required for custom interval)
    #[arg(long)]
    pub custom_days: Option<i64>,

    /// First billing date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub start: Option<String>,

    /// Category: entertainment, productivity, health, education, utilities, shopping, other
    #[arg(short, long, default_value = "other")]
    pub category: String,

    /// Currency code (default from settings)
    #[arg(long)]
    pub currency: Option<String>,

    /// Free-text note
    #[arg(short, long)]
    pub description: Option<String>,

    /// Icon URL
    #[arg(long)]
    pub icon_url: Option<String>,
}

#[derive(Args, Default)]
pub struct EditArgs {
    /// Subscription name or ID
    pub name_or_id: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New price
    #[arg(long)]
    pub price: Option<f64>,

    /// New billing interval
    #[arg(short, long)]
    pub interval: Option<String>,

    /// New custom period length in days
    #[arg(long)]
    pub custom_days: Option<i64>,

    /// New start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// New category
    #[arg(short, long)]
    pub category: Option<String>,

    /// New currency code
    #[arg(long)]
    pub currency: Option<String>,

    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum PaymentsAction {
    /// Show payment history (all subscriptions unless one is named)
    History {
        /// Subscription name or ID
        name_or_id: Option<String>,

        /// Maximum rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record a one-off payment at the subscription's current price
    Record {
        /// Subscription name or ID
        name_or_id: String,

        /// Payment date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record every payment that has come due and advance billing dates
    Bill,

    /// Generate demo payment history for active subscriptions
    SeedDemo {
        /// Months of history to generate
        #[arg(short, long, default_value = "6")]
        months: u32,

        /// RNG seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Delete all payment history
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Monthly/yearly totals, categories, upcoming payments and trend
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending series for a period
    Spending {
        /// Period: day, week, month, quarter, half-year, year
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Payments due soon
    Upcoming {
        /// Days ahead to look
        #[arg(short, long, default_value = "30")]
        days: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings
    Show,

    /// Set a value (notifications_enabled, reminder_days, dark_mode, default_currency)
    Set {
        /// Setting key
        key: String,

        /// New value
        value: String,
    },

    /// Print the settings file location
    Path,
}

#[derive(Subcommand)]
pub enum ExportType {
    /// Export subscriptions to CSV
    Subscriptions {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export payment history to CSV
    Payments {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export full JSON backup
    Backup {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}
