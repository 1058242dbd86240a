//! Billing normalizer
//!
//! Converts a subscription's price and cadence into comparable monthly,
//! yearly and daily amounts, and computes the next charge date.
//!
//! Weeks and custom periods are normalized against 365.25 days per year
//! (52.1775 weeks) rather than 52/365 so that amounts summed across
//! different intervals stay comparable over long horizons.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::warn;

use crate::models::{BillingInterval, Subscription};

/// Average days per year, accounting for leap years
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Average weeks per year (`DAYS_PER_YEAR / 7`)
pub const WEEKS_PER_YEAR: f64 = 52.1775;

/// Normalized monthly cost of a subscription
pub fn monthly_equivalent(subscription: &Subscription) -> f64 {
    let price = subscription.price;
    match subscription.billing_interval {
        BillingInterval::Weekly => price * (WEEKS_PER_YEAR / 12.0),
        BillingInterval::Monthly => price,
        BillingInterval::Quarterly => price / 3.0,
        BillingInterval::Yearly => price / 12.0,
        BillingInterval::Custom => match custom_periods_per_year(subscription) {
            Some(periods) => price * (periods / 12.0),
            None => 0.0,
        },
    }
}

/// Normalized yearly cost of a subscription
///
/// Computed from the interval directly, not from `monthly_equivalent`.
pub fn yearly_equivalent(subscription: &Subscription) -> f64 {
    let price = subscription.price;
    match subscription.billing_interval {
        BillingInterval::Weekly => price * WEEKS_PER_YEAR,
        BillingInterval::Monthly => price * 12.0,
        BillingInterval::Quarterly => price * 4.0,
        BillingInterval::Yearly => price,
        BillingInterval::Custom => match custom_periods_per_year(subscription) {
            Some(periods) => price * periods,
            None => 0.0,
        },
    }
}

/// Normalized daily cost of a subscription
pub fn daily_equivalent(subscription: &Subscription) -> f64 {
    yearly_equivalent(subscription) / DAYS_PER_YEAR
}

/// Cost attributed to one specific calendar month (daily amount × days in month)
pub fn monthly_amount_for_month(subscription: &Subscription, year: i32, month: u32) -> f64 {
    daily_equivalent(subscription) * days_in_month(year, month) as f64
}

/// Next charge date after `reference`, one billing period later
///
/// Calendar months clamp to the last valid day (Jan 31 + 1 month = Feb 28/29).
pub fn next_billing_date(subscription: &Subscription, reference: NaiveDate) -> NaiveDate {
    match subscription.billing_interval {
        BillingInterval::Weekly => add_days(reference, 7),
        BillingInterval::Monthly => add_months(reference, 1),
        BillingInterval::Quarterly => add_months(reference, 3),
        BillingInterval::Yearly => add_months(reference, 12),
        BillingInterval::Custom => add_days(reference, subscription.custom_interval_days),
    }
}

/// Whether the subscription's cadence can advance a date
pub fn has_valid_interval(subscription: &Subscription) -> bool {
    subscription.billing_interval != BillingInterval::Custom
        || subscription.custom_interval_days > 0
}

fn custom_periods_per_year(subscription: &Subscription) -> Option<f64> {
    if subscription.custom_interval_days > 0 {
        Some(DAYS_PER_YEAR / subscription.custom_interval_days as f64)
    } else {
        warn!(
            subscription = %subscription.id,
            days = subscription.custom_interval_days,
            "Custom interval is not positive, normalizing to zero"
        );
        None
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> i64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days(),
        _ => 30,
    }
}

/// Monthly / yearly / daily view of one subscription
#[derive(Debug, Clone)]
pub struct CalculationBreakdown {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub interval: BillingInterval,
    pub custom_interval_days: i64,
    pub monthly: f64,
    pub yearly: f64,
    pub daily: f64,
    /// Amount attributed to the month of `next_billing_date`
    pub this_month: f64,
}

impl CalculationBreakdown {
    pub fn for_subscription(subscription: &Subscription) -> Self {
        let next = subscription.next_billing_date;
        Self {
            name: subscription.name.clone(),
            price: subscription.price,
            currency: subscription.currency.clone(),
            interval: subscription.billing_interval,
            custom_interval_days: subscription.custom_interval_days,
            monthly: monthly_equivalent(subscription),
            yearly: yearly_equivalent(subscription),
            daily: daily_equivalent(subscription),
            this_month: monthly_amount_for_month(subscription, next.year(), next.month()),
        }
    }
}

impl fmt::Display for CalculationBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Subscription: {}", self.name)?;
        writeln!(f, "Price: {:.2} {}", self.price, self.currency)?;
        writeln!(f, "Interval: {}", self.interval.display_name())?;
        if self.interval == BillingInterval::Custom {
            writeln!(f, "Custom Days: {}", self.custom_interval_days)?;
        }
        writeln!(f, "Monthly Equivalent: {:.2}", self.monthly)?;
        writeln!(f, "Yearly Equivalent: {:.2}", self.yearly)?;
        write!(f, "Daily Equivalent: {:.4}", self.daily)
    }
}
