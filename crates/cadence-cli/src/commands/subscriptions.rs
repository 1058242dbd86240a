//! Subscription command implementations

use anyhow::Result;
use cadence_core::billing::{monthly_equivalent, CalculationBreakdown};
use cadence_core::db::Database;
use cadence_core::models::{
    BillingInterval, Category, NewSubscription, Subscription, SubscriptionUpdate,
};
use cadence_core::{SubscriptionFilter, SubscriptionManager};
use chrono::NaiveDate;

use super::{find_subscription, parse_date_arg, truncate};
use crate::cli::{AddArgs, EditArgs, ListArgs};

fn parse_interval(value: &str) -> Result<BillingInterval> {
    value.parse().map_err(anyhow::Error::msg)
}

fn parse_category(value: &str) -> Result<Category> {
    value.parse().map_err(anyhow::Error::msg)
}

fn print_row(sub: &Subscription) {
    let status_icon = if sub.is_active { "✅" } else { "⏸️ " };
    println!(
        "   {} {:20} │ {:>9.2} {:3}/{:<9} │ {:>8.2}/mo │ next {}",
        status_icon,
        truncate(&sub.name, 20),
        sub.price,
        sub.currency,
        sub.billing_interval.as_str(),
        monthly_equivalent(sub),
        sub.next_billing_date
    );
}

pub fn cmd_subscriptions_list(db: &Database, args: &ListArgs) -> Result<()> {
    let interval = args.interval.as_deref().map(parse_interval).transpose()?;
    let categories = args
        .category
        .iter()
        .map(|c| parse_category(c))
        .collect::<Result<Vec<_>>>()?;

    let subscriptions = if args.all {
        db.list_all_subscriptions()?
    } else {
        db.list_active_subscriptions()?
    };

    if subscriptions.is_empty() {
        println!("No subscriptions yet. Add one with:");
        println!("  cadence subscriptions add Netflix 15.99 --category entertainment");
        return Ok(());
    }

    let filtered = SubscriptionFilter::new()
        .search(args.search.as_deref())
        .interval(interval)
        .categories(categories)
        .price_range(args.min_price, args.max_price)
        .apply(subscriptions);

    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");

    if filtered.subscriptions.is_empty() {
        println!("   No subscriptions match the filter.");
        return Ok(());
    }

    for sub in &filtered.subscriptions {
        print_row(sub);
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} shown │ {:.2}/mo",
        filtered.subscriptions.len(),
        filtered.total_monthly
    );

    Ok(())
}

pub fn cmd_subscriptions_add(
    db: &Database,
    args: &AddArgs,
    default_currency: &str,
    today: NaiveDate,
) -> Result<Subscription> {
    let interval = parse_interval(&args.interval)?;
    let category = parse_category(&args.category)?;
    let start = parse_date_arg(args.start.as_deref(), "start", today)?;

    let mut new = NewSubscription::new(args.name.clone(), args.price, interval, start)
        .with_category(category)
        .with_custom_days(args.custom_days.unwrap_or(0));
    new.currency = args
        .currency
        .clone()
        .unwrap_or_else(|| default_currency.to_string());
    new.description = args.description.clone();
    new.icon_url = args.icon_url.clone();

    let sub = SubscriptionManager::new(db).create(new)?;

    println!("✅ Added {} (ID: {})", sub.name, sub.id);
    println!(
        "   {:.2} {} {} │ {:.2}/mo │ next payment {}",
        sub.price,
        sub.currency,
        sub.billing_interval.display_name().to_lowercase(),
        monthly_equivalent(&sub),
        sub.next_billing_date
    );

    Ok(sub)
}

pub fn cmd_subscriptions_edit(db: &Database, args: &EditArgs) -> Result<Subscription> {
    let existing = find_subscription(db, &args.name_or_id)?;

    let start_date = args
        .start
        .as_deref()
        .map(|s| parse_date_arg(Some(s), "start", existing.start_date))
        .transpose()?;

    let update = SubscriptionUpdate {
        name: args.name.clone(),
        price: args.price,
        currency: args.currency.clone(),
        billing_interval: args.interval.as_deref().map(parse_interval).transpose()?,
        custom_interval_days: args.custom_days,
        start_date,
        category: args.category.as_deref().map(parse_category).transpose()?,
        description: args.description.clone(),
        is_active: None,
    };

    let sub = SubscriptionManager::new(db).update(&existing.id, update)?;
    println!("✅ Updated {} (ID: {})", sub.name, sub.id);
    if sub.next_billing_date != existing.next_billing_date {
        println!(
            "   Next payment moved: {} → {}",
            existing.next_billing_date, sub.next_billing_date
        );
    }

    Ok(sub)
}

pub fn cmd_subscriptions_show(db: &Database, name_or_id: &str) -> Result<()> {
    let sub = find_subscription(db, name_or_id)?;
    let breakdown = CalculationBreakdown::for_subscription(&sub);

    println!();
    println!("📋 {}", sub.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   ID:           {}", sub.id);
    println!(
        "   Status:       {}",
        if sub.is_active { "active" } else { "paused" }
    );
    println!("   Category:     {}", sub.category.display_name());
    println!("   Started:      {}", sub.start_date);
    println!("   Next payment: {}", sub.next_billing_date);
    if let Some(desc) = &sub.description {
        println!("   Note:         {}", desc);
    }
    if let Some(icon) = &sub.icon_url {
        println!("   Icon:         {}", icon);
    }

    println!();
    for line in breakdown.to_string().lines() {
        println!("   {}", line);
    }
    println!("   This Month: {:.2}", breakdown.this_month);

    let history = db.payment_history_for(&sub.id)?;
    if !history.is_empty() {
        println!();
        println!("   Recent payments:");
        for payment in history.iter().take(5) {
            println!(
                "   {} │ {:>9.2} {}",
                payment.payment_date, payment.amount, payment.currency
            );
        }
        if history.len() > 5 {
            println!("   ... and {} more", history.len() - 5);
        }
    }

    Ok(())
}

pub fn cmd_subscriptions_set_active(db: &Database, name_or_id: &str, active: bool) -> Result<()> {
    let sub = find_subscription(db, name_or_id)?;
    if sub.is_active == active {
        println!(
            "ℹ️  {} is already {}",
            sub.name,
            if active { "active" } else { "paused" }
        );
        return Ok(());
    }

    let sub = SubscriptionManager::new(db).set_active(&sub.id, active)?;
    if active {
        println!("▶️  Resumed {} (next payment {})", sub.name, sub.next_billing_date);
    } else {
        println!("⏸️  Paused {}", sub.name);
    }

    Ok(())
}

pub fn cmd_subscriptions_delete(db: &Database, name_or_id: &str) -> Result<()> {
    let sub = find_subscription(db, name_or_id)?;
    SubscriptionManager::new(db).delete(&sub.id)?;

    println!("🗑️  Deleted {} (ID: {})", sub.name, sub.id);
    println!("   Payment history was kept for reports.");

    Ok(())
}
