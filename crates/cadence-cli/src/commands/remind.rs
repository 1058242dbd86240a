//! Reminder commands
//!
//! `cadence remind` prints reminders once. With `--daemon` it keeps running,
//! re-checking on a fixed interval and whenever the subscription list changes:
//!
//! - `CADENCE_REMINDER_INTERVAL_HOURS`: hours between scheduled checks (default: 24)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use cadence_core::db::Database;
use cadence_core::{build_reminders, Reminder, ReminderKind, Settings};
use chrono::{Local, NaiveDate};
use tokio::time::interval;
use tracing::{error, info, warn};

use super::load_settings;

const DEFAULT_INTERVAL_HOURS: u64 = 24;

/// Configuration for the reminder daemon
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderScheduleConfig {
    /// Interval between scheduled checks in hours
    pub interval_hours: u64,
}

impl Default for ReminderScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: DEFAULT_INTERVAL_HOURS,
        }
    }
}

impl ReminderScheduleConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("CADENCE_REMINDER_INTERVAL_HOURS").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };

        match raw.trim().parse::<u64>() {
            Ok(0) => {
                warn!(
                    "CADENCE_REMINDER_INTERVAL_HOURS is 0, using {} hours",
                    DEFAULT_INTERVAL_HOURS
                );
                Self::default()
            }
            Ok(hours) => Self {
                interval_hours: hours,
            },
            Err(_) => {
                warn!(
                    "Invalid CADENCE_REMINDER_INTERVAL_HOURS '{}', using {} hours",
                    raw, DEFAULT_INTERVAL_HOURS
                );
                Self::default()
            }
        }
    }
}

fn kind_icon(kind: ReminderKind) -> &'static str {
    match kind {
        ReminderKind::DueToday => "🔴",
        ReminderKind::DueTomorrow => "🟠",
        ReminderKind::Upcoming(_) => "🔔",
    }
}

fn print_reminders(reminders: &[Reminder]) {
    for r in reminders {
        println!("   {} {}: {}", kind_icon(r.kind), r.title, r.body);
    }
}

pub fn cmd_remind(db: &Database, settings: &Settings, today: NaiveDate) -> Result<Vec<Reminder>> {
    if !settings.notifications.enabled {
        println!("🔕 Notifications are disabled. Enable them with:");
        println!("  cadence settings set notifications_enabled true");
        return Ok(Vec::new());
    }

    let reminders = build_reminders(db, today, settings)?;
    if reminders.is_empty() {
        println!(
            "✅ Nothing due in the next {} days.",
            settings.notifications.reminder_days
        );
        return Ok(reminders);
    }

    println!();
    println!("🔔 Payment Reminders");
    println!("   ─────────────────────────────────────────────────────────────");
    print_reminders(&reminders);

    Ok(reminders)
}

/// Identifies one reminder for one billing date
type SeenKey = (String, NaiveDate, ReminderKind);

/// Reminders not yet shown in this daemon session
///
/// A reminder is new when its subscription, due date or kind differs from
/// every one already shown, so a payment moving from "in 3 days" to
/// "tomorrow" to "today" is announced at each step. Keys for dates before
/// `today` are dropped, which lets the next billing cycle through.
fn unseen(
    reminders: Vec<Reminder>,
    seen: &mut HashSet<SeenKey>,
    today: NaiveDate,
) -> Vec<Reminder> {
    seen.retain(|(_, due_date, _)| *due_date >= today);
    reminders
        .into_iter()
        .filter(|r| seen.insert((r.subscription_id.clone(), r.due_date, r.kind)))
        .collect()
}

/// Run one check, printing reminders not shown before
fn run_check(
    db: &Database,
    settings_path: Option<&Path>,
    seen: &mut HashSet<SeenKey>,
) -> Result<usize> {
    let settings = load_settings(settings_path)?;
    let today = Local::now().date_naive();
    let fresh = unseen(build_reminders(db, today, &settings)?, seen, today);

    if !fresh.is_empty() {
        println!();
        println!("🔔 Payment Reminders ({})", today);
        print_reminders(&fresh);
    }

    Ok(fresh.len())
}

pub async fn cmd_remind_daemon(db: Database, settings_path: Option<PathBuf>) -> Result<()> {
    let config = ReminderScheduleConfig::from_env();
    info!(
        "Starting reminder daemon: every {} hours and on subscription changes",
        config.interval_hours
    );

    let mut seen = HashSet::new();
    let mut watch = db.watch_active_subscriptions();
    watch.current()?;

    run_check(&db, settings_path.as_deref(), &mut seen)?;

    let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));
    // Skip the first immediate tick, we just checked
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("Running scheduled reminder check...");
            }
            changed = watch.changed() => {
                match changed {
                    Ok(active) => info!("Subscriptions changed ({} active), re-checking", active.len()),
                    Err(e) => {
                        error!("Change notifications stopped: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down reminder daemon");
                break;
            }
        }

        match run_check(&db, settings_path.as_deref(), &mut seen) {
            Ok(count) if count > 0 => info!("Sent {} reminders", count),
            Ok(_) => {}
            Err(e) => error!("Reminder check failed: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::manager::SubscriptionManager;
    use cadence_core::models::{BillingInterval, NewSubscription};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reminder(id: &str, due_date: NaiveDate, kind: ReminderKind) -> Reminder {
        Reminder {
            subscription_id: id.to_string(),
            due_date,
            kind,
            title: kind.title().to_string(),
            body: format!("{} - 15.99", id),
        }
    }

    #[test]
    fn test_schedule_config_from_value() {
        assert_eq!(ReminderScheduleConfig::from_value(None).interval_hours, 24);
        assert_eq!(
            ReminderScheduleConfig::from_value(Some("6")).interval_hours,
            6
        );
        assert_eq!(
            ReminderScheduleConfig::from_value(Some("0")).interval_hours,
            24
        );
        assert_eq!(
            ReminderScheduleConfig::from_value(Some("soon")).interval_hours,
            24
        );
    }

    #[test]
    fn test_unseen_filters_repeats() {
        let mut seen = HashSet::new();
        let today = date(2024, 3, 9);
        let due = date(2024, 3, 10);

        let first = unseen(
            vec![
                reminder("a", due, ReminderKind::DueTomorrow),
                reminder("b", due, ReminderKind::DueTomorrow),
            ],
            &mut seen,
            today,
        );
        assert_eq!(first.len(), 2);

        // Same check again later in the day
        let second = unseen(
            vec![
                reminder("a", due, ReminderKind::DueTomorrow),
                reminder("b", due, ReminderKind::DueTomorrow),
            ],
            &mut seen,
            today,
        );
        assert!(second.is_empty());
    }

    #[test]
    fn test_daemon_walks_payment_to_due_date() {
        let db = Database::in_memory().unwrap();
        let settings = Settings::default();
        // Next billing date is Mar 10
        SubscriptionManager::new(&db)
            .create(NewSubscription::new(
                "Netflix",
                15.99,
                BillingInterval::Monthly,
                date(2024, 2, 10),
            ))
            .unwrap();

        let mut seen = HashSet::new();
        let mut shown = Vec::new();
        for day in [7, 8, 9, 9, 10, 10] {
            let today = date(2024, 3, day);
            let reminders = build_reminders(&db, today, &settings).unwrap();
            let fresh = unseen(reminders, &mut seen, today);
            shown.extend(fresh.into_iter().map(|r| r.title));
        }
        assert_eq!(
            shown,
            vec![
                "Upcoming Payment",
                "Upcoming Payment",
                "Payment Due Tomorrow",
                "Payment Due Today",
            ]
        );

        // After billing, the next cycle is announced again
        SubscriptionManager::new(&db)
            .record_due_payments(date(2024, 3, 10))
            .unwrap();
        let today = date(2024, 4, 9);
        let reminders = build_reminders(&db, today, &settings).unwrap();
        let next_cycle = unseen(reminders, &mut seen, today);
        assert_eq!(next_cycle.len(), 1);
        assert_eq!(next_cycle[0].kind, ReminderKind::DueTomorrow);
        assert_eq!(next_cycle[0].due_date, date(2024, 4, 10));
        assert!(seen.iter().all(|(_, due, _)| *due >= date(2024, 4, 9)));
    }
}
