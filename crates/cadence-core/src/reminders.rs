//! Payment reminders
//!
//! Turns upcoming payments into notification-ready text. Delivery is up to
//! the caller (the CLI prints them).

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::analytics::upcoming_payments;
use crate::error::Result;
use crate::models::UpcomingPayment;
use crate::settings::Settings;
use crate::store::SubscriptionStore;

/// How soon a payment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReminderKind {
    DueToday,
    DueTomorrow,
    /// Due in the given number of days (always > 1)
    Upcoming(i64),
}

impl ReminderKind {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => Self::DueToday,
            1 => Self::DueTomorrow,
            d => Self::Upcoming(d),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DueToday => "Payment Due Today",
            Self::DueTomorrow => "Payment Due Tomorrow",
            Self::Upcoming(_) => "Upcoming Payment",
        }
    }
}

/// A notification for one upcoming payment
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub subscription_id: String,
    /// Billing date the reminder is about
    pub due_date: NaiveDate,
    pub kind: ReminderKind,
    pub title: String,
    pub body: String,
}

impl Reminder {
    pub fn for_payment(payment: &UpcomingPayment) -> Self {
        let kind = ReminderKind::from_days(payment.days_until_payment);
        let name = &payment.subscription.name;
        let body = match kind {
            ReminderKind::Upcoming(days) => {
                format!("{} in {} days - {:.2}", name, days, payment.amount)
            }
            _ => format!("{} - {:.2}", name, payment.amount),
        };

        Self {
            subscription_id: payment.subscription.id.clone(),
            due_date: payment.subscription.next_billing_date,
            kind,
            title: kind.title().to_string(),
            body,
        }
    }
}

/// Reminders for every active payment due within the configured window
///
/// Returns nothing when notifications are disabled.
pub fn build_reminders<S: SubscriptionStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    settings: &Settings,
) -> Result<Vec<Reminder>> {
    if !settings.notifications.enabled {
        debug!("Notifications disabled, skipping reminders");
        return Ok(Vec::new());
    }

    let upcoming = upcoming_payments(store, today, settings.notifications.reminder_days)?;
    Ok(upcoming.iter().map(Reminder::for_payment).collect())
}
