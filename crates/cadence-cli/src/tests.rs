//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use cadence_core::db::Database;
use cadence_core::models::{BillingInterval, Category, Subscription};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::{AddArgs, EditArgs, ListArgs};
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 3, 10)
}

fn add_args(name: &str, price: f64, interval: &str, start: &str) -> AddArgs {
    AddArgs {
        name: name.to_string(),
        price,
        interval: interval.to_string(),
        custom_days: None,
        start: Some(start.to_string()),
        category: "other".to_string(),
        currency: None,
        description: None,
        icon_url: None,
    }
}

fn add_subscription(db: &Database, name: &str, price: f64, start: &str) -> Subscription {
    commands::cmd_subscriptions_add(db, &add_args(name, price, "monthly", start), "USD", today())
        .unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is too long", 10), "this is...");
    assert_eq!(truncate("Café Crème Club", 8), "Café ...");
}

#[test]
fn test_parse_date_arg() {
    let fallback = today();
    assert_eq!(
        commands::parse_date_arg(None, "date", fallback).unwrap(),
        fallback
    );
    assert_eq!(
        commands::parse_date_arg(Some("2024-01-31"), "date", fallback).unwrap(),
        date(2024, 1, 31)
    );

    let err = commands::parse_date_arg(Some("31/01/2024"), "start", fallback).unwrap_err();
    assert!(err.to_string().contains("--start"));
}

#[test]
fn test_find_subscription_by_id_and_name() {
    let db = setup_test_db();
    let sub = add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    assert_eq!(commands::find_subscription(&db, &sub.id).unwrap().id, sub.id);
    assert_eq!(
        commands::find_subscription(&db, "netflix").unwrap().id,
        sub.id
    );

    let result = commands::find_subscription(&db, "Hulu");
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_find_subscription_ambiguous_name() {
    let db = setup_test_db();
    add_subscription(&db, "Gym", 40.0, "2024-02-01");
    add_subscription(&db, "gym", 25.0, "2024-02-15");

    let result = commands::find_subscription(&db, "GYM");
    assert!(result.unwrap_err().to_string().contains("use the ID"));
}

#[test]
fn test_open_db_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cli.db");

    let db = commands::open_db(&path, true).unwrap();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    drop(db);

    let reopened = commands::open_db(&path, true).unwrap();
    assert_eq!(reopened.count_subscriptions().unwrap(), (1, 1));
}

#[test]
fn test_cmd_init_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.db");

    assert!(commands::cmd_status(&path, true, today()).is_ok());
    assert!(commands::cmd_init(&path, true).is_ok());
    assert!(path.exists());
    assert!(commands::cmd_status(&path, true, today()).is_ok());
}

#[test]
fn test_status_summary() {
    let db = setup_test_db();
    let empty = commands::status_summary(&db).unwrap();
    assert_eq!(empty.subscriptions, 0);
    assert_eq!(empty.monthly_spend, 0.0);
    assert!(empty.next_due.is_none());
    assert!(empty.last_payment.is_none());

    // Next billing dates: Mar 10 and Apr 1
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    commands::cmd_subscriptions_add(
        &db,
        &add_args("Backup", 120.0, "yearly", "2023-04-01"),
        "USD",
        today(),
    )
    .unwrap();
    commands::cmd_payments_record(&db, "Netflix", Some("2024-02-10"), today()).unwrap();

    let summary = commands::status_summary(&db).unwrap();
    assert_eq!(summary.subscriptions, 2);
    assert_eq!(summary.active, 2);
    assert_eq!(summary.payments, 1);
    assert_eq!(summary.last_payment, Some(date(2024, 2, 10)));
    assert!((summary.monthly_spend - 25.99).abs() < 1e-9);

    let next = summary.next_due.unwrap();
    assert_eq!(next.name, "Netflix");
    assert_eq!(next.next_billing_date, today());
}

// ========== Subscriptions Command Tests ==========

#[test]
fn test_cmd_subscriptions_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_subscriptions_list(&db, &ListArgs::default()).is_ok());
}

#[test]
fn test_cmd_subscriptions_list_with_filters() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    add_subscription(&db, "Spotify", 9.99, "2024-02-11");

    let args = ListArgs {
        all: true,
        search: Some("net".to_string()),
        interval: Some("monthly".to_string()),
        category: vec!["other".to_string()],
        min_price: Some(5.0),
        max_price: None,
    };
    assert!(commands::cmd_subscriptions_list(&db, &args).is_ok());
}

#[test]
fn test_cmd_subscriptions_list_invalid_interval() {
    let db = setup_test_db();
    let args = ListArgs {
        interval: Some("fortnightly".to_string()),
        ..Default::default()
    };
    let result = commands::cmd_subscriptions_list(&db, &args);
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unknown billing interval"));
}

#[test]
fn test_cmd_subscriptions_add() {
    let db = setup_test_db();
    let mut args = add_args("  Netflix ", 15.99, "monthly", "2024-02-10");
    args.category = "entertainment".to_string();
    args.description = Some("Family plan".to_string());

    let sub = commands::cmd_subscriptions_add(&db, &args, "eur", today()).unwrap();
    assert_eq!(sub.name, "Netflix");
    assert_eq!(sub.currency, "EUR");
    assert_eq!(sub.category, Category::Entertainment);
    assert_eq!(sub.next_billing_date, date(2024, 3, 10));

    let stored = db.get_subscription(&sub.id).unwrap().unwrap();
    assert_eq!(stored.description.as_deref(), Some("Family plan"));
}

#[test]
fn test_cmd_subscriptions_add_defaults_start_to_today() {
    let db = setup_test_db();
    let mut args = add_args("Gym", 40.0, "weekly", "2024-01-01");
    args.start = None;

    let sub = commands::cmd_subscriptions_add(&db, &args, "USD", today()).unwrap();
    assert_eq!(sub.start_date, today());
    assert_eq!(sub.next_billing_date, date(2024, 3, 17));
}

#[test]
fn test_cmd_subscriptions_add_custom_requires_days() {
    let db = setup_test_db();
    let args = add_args("Vitamins", 30.0, "custom", "2024-01-01");
    assert!(commands::cmd_subscriptions_add(&db, &args, "USD", today()).is_err());

    let mut args = add_args("Vitamins", 30.0, "custom", "2024-01-01");
    args.custom_days = Some(45);
    let sub = commands::cmd_subscriptions_add(&db, &args, "USD", today()).unwrap();
    assert_eq!(sub.billing_interval, BillingInterval::Custom);
    assert_eq!(sub.next_billing_date, date(2024, 2, 15));
}

#[test]
fn test_cmd_subscriptions_add_invalid_category() {
    let db = setup_test_db();
    let mut args = add_args("Netflix", 15.99, "monthly", "2024-02-10");
    args.category = "streaming".to_string();

    let result = commands::cmd_subscriptions_add(&db, &args, "USD", today());
    assert!(result.unwrap_err().to_string().contains("Unknown category"));
    assert_eq!(db.count_subscriptions().unwrap(), (0, 0));
}

#[test]
fn test_cmd_subscriptions_edit() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    let args = EditArgs {
        name_or_id: "Netflix".to_string(),
        price: Some(17.99),
        interval: Some("yearly".to_string()),
        ..Default::default()
    };
    let sub = commands::cmd_subscriptions_edit(&db, &args).unwrap();
    assert_eq!(sub.price, 17.99);
    assert_eq!(sub.billing_interval, BillingInterval::Yearly);
    assert_eq!(sub.next_billing_date, date(2025, 2, 10));
}

#[test]
fn test_cmd_subscriptions_show() {
    let db = setup_test_db();
    let sub = add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    commands::cmd_payments_record(&db, &sub.id, Some("2024-02-10"), today()).unwrap();

    assert!(commands::cmd_subscriptions_show(&db, "Netflix").is_ok());
    assert!(commands::cmd_subscriptions_show(&db, "missing").is_err());
}

#[test]
fn test_cmd_subscriptions_pause_and_resume() {
    let db = setup_test_db();
    let sub = add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    commands::cmd_subscriptions_set_active(&db, "Netflix", false).unwrap();
    assert!(!db.get_subscription(&sub.id).unwrap().unwrap().is_active);
    assert!(db.list_active_subscriptions().unwrap().is_empty());

    // Pausing twice is a no-op
    assert!(commands::cmd_subscriptions_set_active(&db, "Netflix", false).is_ok());

    commands::cmd_subscriptions_set_active(&db, &sub.id, true).unwrap();
    assert!(db.get_subscription(&sub.id).unwrap().unwrap().is_active);
}

#[test]
fn test_cmd_subscriptions_delete_keeps_history() {
    let db = setup_test_db();
    let sub = add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    commands::cmd_payments_record(&db, "Netflix", Some("2024-02-10"), today()).unwrap();

    commands::cmd_subscriptions_delete(&db, "Netflix").unwrap();
    assert!(db.get_subscription(&sub.id).unwrap().is_none());
    assert_eq!(db.payment_history_for(&sub.id).unwrap().len(), 1);

    // History of deleted subscriptions still lists
    assert!(commands::cmd_payments_history(&db, None, 10).is_ok());
}

// ========== Payments Command Tests ==========

#[test]
fn test_cmd_payments_history_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_payments_history(&db, None, 20).is_ok());
}

#[test]
fn test_cmd_payments_record() {
    let db = setup_test_db();
    let sub = add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    let payment = commands::cmd_payments_record(&db, "Netflix", None, today()).unwrap();
    assert_eq!(payment.subscription_id, sub.id);
    assert_eq!(payment.amount, 15.99);
    assert_eq!(payment.payment_date, today());

    let result = commands::cmd_payments_record(&db, "Netflix", Some("yesterday"), today());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid --date format"));
}

#[test]
fn test_cmd_payments_bill() {
    let db = setup_test_db();
    let netflix = add_subscription(&db, "Netflix", 15.99, "2024-01-10");
    add_subscription(&db, "Later", 5.0, "2024-03-01");

    // Netflix: Feb 10 and Mar 10. Later: Apr 1.
    assert_eq!(commands::cmd_payments_bill(&db, today()).unwrap(), 2);
    assert_eq!(
        db.get_subscription(&netflix.id)
            .unwrap()
            .unwrap()
            .next_billing_date,
        date(2024, 4, 10)
    );

    // Already caught up
    assert_eq!(commands::cmd_payments_bill(&db, today()).unwrap(), 0);
}

#[test]
fn test_cmd_edit_between_bills_keeps_schedule() {
    let db = setup_test_db();
    let netflix = add_subscription(&db, "Netflix", 15.99, "2024-01-10");
    assert_eq!(commands::cmd_payments_bill(&db, today()).unwrap(), 2);

    let edited = commands::cmd_subscriptions_edit(
        &db,
        &EditArgs {
            name_or_id: "Netflix".to_string(),
            interval: Some("monthly".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(edited.next_billing_date, date(2024, 4, 10));

    assert_eq!(commands::cmd_payments_bill(&db, today()).unwrap(), 0);
    assert_eq!(db.payment_history_for(&netflix.id).unwrap().len(), 2);
}

#[test]
fn test_cmd_payments_seed_demo() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-01-01");

    // Feb 10 and Jan 10; Dec 10 is before the start date
    let written = commands::cmd_payments_seed_demo(&db, 6, Some(7), today()).unwrap();
    assert_eq!(written, 2);
    assert_eq!(db.count_payments().unwrap(), 2);

    assert!(commands::cmd_payments_seed_demo(&db, 0, None, today()).is_err());
}

#[test]
fn test_cmd_payments_clear_requires_confirmation() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    commands::cmd_payments_record(&db, "Netflix", None, today()).unwrap();

    assert!(commands::cmd_payments_clear(&db, false).is_err());
    assert_eq!(db.count_payments().unwrap(), 1);

    commands::cmd_payments_clear(&db, true).unwrap();
    assert_eq!(db.count_payments().unwrap(), 0);
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_report_analytics_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_report_analytics(&db, today(), false).is_ok());
}

#[test]
fn test_cmd_report_analytics_with_data() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-01-10");
    add_subscription(&db, "Spotify", 9.99, "2024-01-11");
    commands::cmd_payments_bill(&db, today()).unwrap();

    assert!(commands::cmd_report_analytics(&db, today(), false).is_ok());
    assert!(commands::cmd_report_analytics(&db, today(), true).is_ok());
}

#[test]
fn test_cmd_report_spending_demo_and_real() {
    let db = setup_test_db();
    let mut rng = StdRng::seed_from_u64(1);

    // No history yet: sample data for every period
    for period in ["day", "week", "month", "quarter", "half-year", "year"] {
        assert!(commands::cmd_report_spending(&db, period, today(), false, &mut rng).is_ok());
    }

    add_subscription(&db, "Netflix", 15.99, "2024-01-10");
    commands::cmd_payments_bill(&db, today()).unwrap();
    assert!(commands::cmd_report_spending(&db, "month", today(), true, &mut rng).is_ok());
}

#[test]
fn test_cmd_report_spending_invalid_period() {
    let db = setup_test_db();
    let mut rng = StdRng::seed_from_u64(1);
    let result = commands::cmd_report_spending(&db, "decade", today(), false, &mut rng);
    assert!(result.unwrap_err().to_string().contains("Unknown period"));
}

#[test]
fn test_cmd_report_upcoming() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    assert!(commands::cmd_report_upcoming(&db, 7, today(), false).is_ok());
    assert!(commands::cmd_report_upcoming(&db, 7, today(), true).is_ok());
    assert!(commands::cmd_report_upcoming(&db, -1, today(), false).is_err());
}

// ========== Remind Command Tests ==========

#[test]
fn test_cmd_remind() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    add_subscription(&db, "Spotify", 9.99, "2024-02-11");

    let settings = cadence_core::Settings::default();
    let reminders = commands::cmd_remind(&db, &settings, today()).unwrap();
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].body, "Netflix - 15.99");
    assert_eq!(reminders[1].title, "Payment Due Tomorrow");
}

#[test]
fn test_cmd_remind_disabled() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");

    let mut settings = cadence_core::Settings::default();
    settings.set("notifications_enabled", "off").unwrap();
    assert!(commands::cmd_remind(&db, &settings, today())
        .unwrap()
        .is_empty());
}

// ========== Settings Command Tests ==========

#[test]
fn test_cmd_settings_set_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    assert!(commands::cmd_settings_show(Some(path.as_path())).is_ok());
    assert!(!path.exists());

    commands::cmd_settings_set(Some(path.as_path()), "reminder_days", "7").unwrap();
    commands::cmd_settings_set(Some(path.as_path()), "default_currency", "gbp").unwrap();
    assert!(path.exists());

    let settings = commands::load_settings(Some(path.as_path())).unwrap();
    assert_eq!(settings.notifications.reminder_days, 7);
    assert_eq!(settings.display.default_currency, "GBP");
}

#[test]
fn test_cmd_settings_set_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    assert!(commands::cmd_settings_set(Some(path.as_path()), "reminder_days", "99").is_err());
    assert!(commands::cmd_settings_set(Some(path.as_path()), "font_size", "12").is_err());
    assert!(!path.exists());
}

#[test]
fn test_cmd_settings_path() {
    let path = std::path::Path::new("/tmp/cadence-settings.toml");
    assert_eq!(commands::settings_path(Some(path)).unwrap(), path);
    assert!(commands::cmd_settings_path(Some(path)).is_ok());
}

// ========== Export Command Tests ==========

#[test]
fn test_cmd_export_csv_files() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-02-10");
    commands::cmd_payments_record(&db, "Netflix", None, today()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let subs_path = dir.path().join("subs.csv");
    let payments_path = dir.path().join("payments.csv");

    commands::cmd_export_subscriptions(&db, Some(subs_path.as_path())).unwrap();
    commands::cmd_export_payments(&db, Some(payments_path.as_path())).unwrap();

    let subs = std::fs::read_to_string(&subs_path).unwrap();
    assert!(subs.lines().next().unwrap().contains("name"));
    assert!(subs.contains("Netflix"));

    let payments = std::fs::read_to_string(&payments_path).unwrap();
    assert_eq!(payments.lines().count(), 2);
    assert!(payments.contains("15.99"));
}

#[test]
fn test_cmd_backup_round_trip() {
    let db = setup_test_db();
    add_subscription(&db, "Netflix", 15.99, "2024-01-10");
    add_subscription(&db, "Spotify", 9.99, "2024-01-11");
    commands::cmd_payments_bill(&db, today()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let backup_path = dir.path().join("backup.json");
    let backup = commands::cmd_export_backup(&db, &backup_path).unwrap();
    assert_eq!(backup.subscriptions.len(), 2);
    // Netflix: Feb 10, Mar 10. Spotify: Feb 11.
    assert_eq!(backup.payments.len(), 3);

    let restored = setup_test_db();
    let stats = commands::cmd_import_backup(&restored, &backup_path, false).unwrap();
    assert_eq!(stats.subscriptions, 2);
    assert_eq!(stats.payments, 3);
    assert_eq!(stats.skipped, 0);
    assert_eq!(restored.count_payments().unwrap(), 3);

    // Same backup again: everything already present
    let stats = commands::cmd_import_backup(&restored, &backup_path, false).unwrap();
    assert_eq!(stats.skipped, 5);

    // Clearing first restores cleanly
    let stats = commands::cmd_import_backup(&restored, &backup_path, true).unwrap();
    assert_eq!(stats.subscriptions, 2);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn test_cmd_import_backup_invalid_file() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = commands::cmd_import_backup(&db, &path, false);
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("not a valid backup file"));

    let missing = dir.path().join("missing.json");
    assert!(commands::cmd_import_backup(&db, &missing, false).is_err());
}
