//! Payment command implementations (history, record, bill, seed-demo, clear)

use std::collections::HashMap;

use anyhow::Result;
use cadence_core::db::Database;
use cadence_core::demo::generate_payment_history;
use cadence_core::models::PaymentHistory;
use cadence_core::SubscriptionManager;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{find_subscription, parse_date_arg, truncate};

pub fn cmd_payments_history(db: &Database, name_or_id: Option<&str>, limit: usize) -> Result<()> {
    let payments = match name_or_id {
        Some(key) => {
            let sub = find_subscription(db, key)?;
            db.payment_history_for(&sub.id)?
        }
        None => db.list_payments()?,
    };

    if payments.is_empty() {
        println!("No payments recorded yet. Catch up with:");
        println!("  cadence payments bill");
        return Ok(());
    }

    let names: HashMap<String, String> = db
        .list_all_subscriptions()?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    println!();
    println!("💳 Payment History");
    println!("   ─────────────────────────────────────────────────────────────");

    for payment in payments.iter().take(limit) {
        let name = names
            .get(&payment.subscription_id)
            .map(|n| truncate(n, 20))
            .unwrap_or_else(|| "(deleted)".to_string());
        println!(
            "   {} │ {:20} │ {:>9.2} {}",
            payment.payment_date, name, payment.amount, payment.currency
        );
    }

    if payments.len() > limit {
        println!("   ... and {} more", payments.len() - limit);
    }

    let total: f64 = payments.iter().map(|p| p.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} payments │ {:.2} total", payments.len(), total);

    Ok(())
}

pub fn cmd_payments_record(
    db: &Database,
    name_or_id: &str,
    date: Option<&str>,
    today: NaiveDate,
) -> Result<PaymentHistory> {
    let sub = find_subscription(db, name_or_id)?;
    let date = parse_date_arg(date, "date", today)?;

    let payment = SubscriptionManager::new(db).record_payment(&sub.id, date)?;
    println!(
        "✅ Recorded {:.2} {} for {} on {}",
        payment.amount, payment.currency, sub.name, payment.payment_date
    );

    Ok(payment)
}

pub fn cmd_payments_bill(db: &Database, today: NaiveDate) -> Result<usize> {
    println!("🧾 Recording payments due on or before {}...", today);

    let recorded = SubscriptionManager::new(db).record_due_payments(today)?;
    if recorded.is_empty() {
        println!("✅ Nothing due. All subscriptions are up to date.");
        return Ok(0);
    }

    let total: f64 = recorded.iter().map(|p| p.amount).sum();
    println!(
        "✅ Recorded {} payments ({:.2} total)",
        recorded.len(),
        total
    );

    Ok(recorded.len())
}

pub fn cmd_payments_seed_demo(
    db: &Database,
    months: u32,
    seed: Option<u64>,
    today: NaiveDate,
) -> Result<usize> {
    if months == 0 {
        anyhow::bail!("--months must be at least 1");
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let written = generate_payment_history(db, today, months, &mut rng)?;
    if written == 0 {
        println!("No active subscriptions with a start date in range. Nothing generated.");
    } else {
        println!("🎲 Generated {} demo payments over {} months", written, months);
        println!("   These are synthetic. Remove them with: cadence payments clear --yes");
    }

    Ok(written)
}

pub fn cmd_payments_clear(db: &Database, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("This deletes all payment history. Re-run with --yes to confirm.");
    }

    let removed = db.clear_all_payment_history()?;
    println!("🗑️  Deleted {} payments", removed);

    Ok(())
}
