//! Report command implementations

use anyhow::Result;
use cadence_core::db::Database;
use cadence_core::models::{Period, UpcomingPayment};
use cadence_core::{compute_analytics, spending_by_period, upcoming_payments};
use chrono::NaiveDate;
use rand::Rng;

use super::truncate;

fn print_upcoming(payments: &[UpcomingPayment]) {
    for p in payments {
        let when = match p.days_until_payment {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            d => format!("in {} days", d),
        };
        println!(
            "   {} │ {:20} │ {:>9.2} {} │ {}",
            p.subscription.next_billing_date,
            truncate(&p.subscription.name, 20),
            p.amount,
            p.subscription.currency,
            when
        );
    }
}

/// Bar for a value relative to the largest in the series
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

pub fn cmd_report_analytics(db: &Database, today: NaiveDate, json: bool) -> Result<()> {
    let analytics = compute_analytics(db, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    if analytics.active_count == 0 {
        println!("No active subscriptions. Add one with:");
        println!("  cadence subscriptions add Netflix 15.99");
        return Ok(());
    }

    println!();
    println!("📊 Subscription Analytics ({})", analytics.generated_on);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Active subscriptions: {}", analytics.active_count);
    println!("   Monthly spend:        {:.2}", analytics.total_monthly_spend);
    println!("   Yearly spend:         {:.2}", analytics.total_yearly_spend);
    println!(
        "   Average per month:    {:.2}",
        analytics.average_subscription_cost
    );
    println!(
        "   Trend:                {} {}",
        analytics.spending_trend.icon(),
        analytics.spending_trend.as_str()
    );

    if !analytics.category_breakdown.is_empty() {
        println!();
        println!("🏷️  By Category");
        println!("   ─────────────────────────────────────────────────────────────");
        for c in &analytics.category_breakdown {
            println!(
                "   {:20} │ {:>9.2}/mo │ {:>5.1}% │ {} subs",
                c.category.display_name(),
                c.monthly_amount,
                c.percentage,
                c.subscription_count
            );
        }
    }

    if !analytics.monthly_spending.is_empty() {
        println!();
        println!("📅 Recent Months");
        println!("   ─────────────────────────────────────────────────────────────");
        for m in &analytics.monthly_spending {
            println!(
                "   {:10} │ {:>9.2} │ {} subs",
                m.period, m.total_amount, m.subscription_count
            );
        }
    }

    if !analytics.next_payments.is_empty() {
        println!();
        println!("⏰ Next 30 Days");
        println!("   ─────────────────────────────────────────────────────────────");
        print_upcoming(&analytics.next_payments);
    }

    Ok(())
}

pub fn cmd_report_spending<R: Rng + ?Sized>(
    db: &Database,
    period: &str,
    today: NaiveDate,
    json: bool,
    rng: &mut R,
) -> Result<()> {
    let period: Period = period.parse().map_err(anyhow::Error::msg)?;
    let series = spending_by_period(db, period, today, rng)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!();
    println!("💸 Spending by {}", period.as_str());
    println!("   ─────────────────────────────────────────────────────────────");
    if series.is_demo {
        println!("   ⚠️  No payment history yet. Showing sample data.");
        println!();
    }

    if series.data.is_empty() {
        println!("   No spending in range.");
        return Ok(());
    }

    let max = series
        .data
        .iter()
        .map(|d| d.total_amount)
        .fold(0.0_f64, f64::max);
    for d in &series.data {
        println!(
            "   {:10} │ {:>9.2} │ {:>3} subs │ {}",
            d.period,
            d.total_amount,
            d.subscription_count,
            bar(d.total_amount, max, 30)
        );
    }

    let total: f64 = series.data.iter().map(|d| d.total_amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: {:.2}", total);

    Ok(())
}

pub fn cmd_report_upcoming(db: &Database, days: i64, today: NaiveDate, json: bool) -> Result<()> {
    if days < 0 {
        anyhow::bail!("--days must not be negative");
    }

    let upcoming = upcoming_payments(db, today, days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&upcoming)?);
        return Ok(());
    }

    if upcoming.is_empty() {
        println!("✅ No payments due in the next {} days.", days);
        return Ok(());
    }

    println!();
    println!("⏰ Upcoming Payments (next {} days)", days);
    println!("   ─────────────────────────────────────────────────────────────");
    print_upcoming(&upcoming);

    let total: f64 = upcoming.iter().map(|p| p.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} payments │ {:.2} total", upcoming.len(), total);

    Ok(())
}
