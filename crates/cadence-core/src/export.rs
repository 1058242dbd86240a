//! Export functionality for subscriptions, payments and full database backups
//!
//! Supports:
//! - Subscription CSV export (with normalized monthly cost)
//! - Payment history CSV export
//! - Full JSON backup export/import

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::billing::monthly_equivalent;
use crate::db::{format_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{PaymentHistory, Subscription};

/// One subscription row in the CSV export
#[derive(Debug, Serialize)]
struct SubscriptionCsvRow<'a> {
    id: &'a str,
    name: &'a str,
    price: String,
    currency: &'a str,
    billing_interval: &'static str,
    custom_interval_days: i64,
    start_date: String,
    next_billing_date: String,
    is_active: bool,
    category: &'static str,
    monthly_equivalent: String,
    description: &'a str,
}

/// One payment row in the CSV export
#[derive(Debug, Serialize)]
struct PaymentCsvRow<'a> {
    id: &'a str,
    subscription_id: &'a str,
    /// Empty when the subscription has since been deleted
    subscription_name: &'a str,
    payment_date: String,
    amount: String,
    currency: &'a str,
}

/// Backup metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Application version that created the backup
    pub version: String,
    /// When the backup was created
    pub created_at: String,
    /// Total number of records in backup
    pub total_records: i64,
}

/// Full database backup structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullBackup {
    pub metadata: BackupMetadata,
    pub subscriptions: Vec<Subscription>,
    pub payments: Vec<PaymentHistory>,
}

/// Import statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub subscriptions: i64,
    pub payments: i64,
    /// Records whose id already existed
    pub skipped: i64,
}

impl Database {
    /// Export all subscriptions to CSV, most recently updated first
    pub fn export_subscriptions_csv(&self) -> Result<String> {
        let subscriptions = self.list_all_subscriptions()?;
        let mut writer = csv::Writer::from_writer(Vec::new());

        for s in &subscriptions {
            writer.serialize(SubscriptionCsvRow {
                id: &s.id,
                name: &s.name,
                price: format!("{:.2}", s.price),
                currency: &s.currency,
                billing_interval: s.billing_interval.as_str(),
                custom_interval_days: s.custom_interval_days,
                start_date: s.start_date.to_string(),
                next_billing_date: s.next_billing_date.to_string(),
                is_active: s.is_active,
                category: s.category.as_str(),
                monthly_equivalent: format!("{:.2}", monthly_equivalent(s)),
                description: s.description.as_deref().unwrap_or(""),
            })?;
        }

        finish_csv(writer)
    }

    /// Export all payments to CSV, newest first
    pub fn export_payments_csv(&self) -> Result<String> {
        let payments = self.list_payments()?;
        let subscriptions = self.list_all_subscriptions()?;
        let mut writer = csv::Writer::from_writer(Vec::new());

        for p in &payments {
            let name = subscriptions
                .iter()
                .find(|s| s.id == p.subscription_id)
                .map(|s| s.name.as_str())
                .unwrap_or("");
            writer.serialize(PaymentCsvRow {
                id: &p.id,
                subscription_id: &p.subscription_id,
                subscription_name: name,
                payment_date: p.payment_date.to_string(),
                amount: format!("{:.2}", p.amount),
                currency: &p.currency,
            })?;
        }

        finish_csv(writer)
    }

    /// Export full database backup
    pub fn export_full_backup(&self) -> Result<FullBackup> {
        let subscriptions = self.list_all_subscriptions()?;
        let payments = self.list_payments()?;
        let total_records = subscriptions.len() + payments.len();

        Ok(FullBackup {
            metadata: BackupMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: Utc::now().to_rfc3339(),
                total_records: total_records as i64,
            },
            subscriptions,
            payments,
        })
    }

    /// Import a full backup
    ///
    /// Clears existing data first if `clear_existing` is true. Otherwise
    /// records whose id already exists are skipped. Runs in one transaction.
    pub fn import_full_backup(
        &self,
        backup: &FullBackup,
        clear_existing: bool,
    ) -> Result<ImportStats> {
        use rusqlite::params;

        if clear_existing {
            self.soft_reset()?;
        }

        let mut stats = ImportStats::default();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for s in &backup.subscriptions {
            let inserted = tx.execute(
                r#"
                INSERT OR IGNORE INTO subscriptions (
                    id, name, price, currency, billing_interval, custom_interval_days, start_date,
                    next_billing_date, is_active, icon_url, category, description, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    s.id,
                    s.name,
                    s.price,
                    s.currency,
                    s.billing_interval.as_str(),
                    s.custom_interval_days,
                    s.start_date.to_string(),
                    s.next_billing_date.to_string(),
                    s.is_active,
                    s.icon_url,
                    s.category.as_str(),
                    s.description,
                    format_datetime(&s.created_at),
                    format_datetime(&s.updated_at),
                ],
            )?;
            if inserted > 0 {
                stats.subscriptions += 1;
            } else {
                stats.skipped += 1;
            }
        }

        for p in &backup.payments {
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO payment_history (id, subscription_id, amount, payment_date, currency) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![p.id, p.subscription_id, p.amount, p.payment_date.to_string(), p.currency],
            )?;
            if inserted > 0 {
                stats.payments += 1;
            } else {
                stats.skipped += 1;
            }
        }

        tx.commit()?;
        drop(conn);
        self.notify_changed();

        info!(
            subscriptions = stats.subscriptions,
            payments = stats.payments,
            skipped = stats.skipped,
            "Imported backup"
        );
        Ok(stats)
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}
