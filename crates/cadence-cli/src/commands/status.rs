//! Status command: where the data lives and what it costs right now

use std::path::Path;

use anyhow::Result;
use cadence_core::analytics::total_monthly;
use cadence_core::db::{Database, DB_KEY_ENV};
use cadence_core::models::Subscription;
use chrono::NaiveDate;

use super::open_db;

/// Snapshot of the tracked subscriptions shown by `cadence status`
#[derive(Debug)]
pub struct StatusSummary {
    pub subscriptions: i64,
    pub active: i64,
    pub payments: i64,
    pub last_payment: Option<NaiveDate>,
    pub monthly_spend: f64,
    /// Earliest billing date among active subscriptions
    pub next_due: Option<Subscription>,
}

pub fn status_summary(db: &Database) -> Result<StatusSummary> {
    let (subscriptions, active) = db.count_subscriptions()?;
    let active_list = db.list_active_subscriptions()?;
    // Both lists come back ordered: active by next billing date, payments newest first
    let last_payment = db.list_payments()?.first().map(|p| p.payment_date);

    Ok(StatusSummary {
        subscriptions,
        active,
        payments: db.count_payments()?,
        last_payment,
        monthly_spend: total_monthly(&active_list),
        next_due: active_list.into_iter().next(),
    })
}

fn encryption_line(no_encrypt: bool, has_key: bool) -> String {
    if no_encrypt {
        "⚠️  Encryption: off (--no-encrypt)".to_string()
    } else if has_key {
        format!("🔒 Encryption: on ({} set)", DB_KEY_ENV)
    } else {
        format!("❌ Encryption: {} missing", DB_KEY_ENV)
    }
}

fn print_summary(summary: &StatusSummary, today: NaiveDate) {
    println!(
        "   Subscriptions: {} tracked, {} active",
        summary.subscriptions, summary.active
    );
    println!(
        "   Spend:         {:.2}/mo, {:.2}/yr",
        summary.monthly_spend,
        summary.monthly_spend * 12.0
    );

    match &summary.next_due {
        Some(sub) => {
            let days = (sub.next_billing_date - today).num_days();
            let when = match days {
                d if d < 0 => format!("{} days overdue, run `cadence payments bill`", -d),
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                d => format!("in {} days", d),
            };
            println!(
                "   Next charge:   {} {:.2} {} on {} ({})",
                sub.name, sub.price, sub.currency, sub.next_billing_date, when
            );
        }
        None => println!("   Next charge:   nothing active"),
    }

    match summary.last_payment {
        Some(date) => println!(
            "   Payments:      {} recorded, last on {}",
            summary.payments, date
        ),
        None => println!("   Payments:      none recorded yet"),
    }
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool, today: NaiveDate) -> Result<()> {
    let has_key = std::env::var(DB_KEY_ENV).is_ok();

    println!();
    println!("📅 Cadence");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   File: {}", db_path.display());
    println!("   {}", encryption_line(no_encrypt, has_key));

    if !db_path.exists() {
        println!();
        println!("   No database yet. Create one with `cadence init`.");
        println!();
        return Ok(());
    }

    println!();
    match open_db(db_path, no_encrypt).and_then(|db| status_summary(&db)) {
        Ok(summary) => print_summary(&summary, today),
        Err(e) => {
            println!("   ❌ Cannot read database: {}", e);
            if !no_encrypt {
                println!("      Check {} or pass --no-encrypt", DB_KEY_ENV);
            }
        }
    }

    println!();
    Ok(())
}
