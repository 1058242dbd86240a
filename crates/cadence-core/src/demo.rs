//! Demo data
//!
//! Synthetic spending series shown while no payment history exists, and a
//! generator that back-fills plausible monthly payments for the active
//! subscriptions. Both take an explicit RNG so tests can seed them.

use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate};
use rand::Rng;
use tracing::info;

use crate::buckets::{period_label, period_start, previous_period_start};
use crate::error::Result;
use crate::models::{PaymentHistory, Period, SpendingPeriodData};
use crate::store::SubscriptionStore;

/// Whole-unit amount range for one synthetic bucket
fn amount_range(period: Period) -> RangeInclusive<u32> {
    match period {
        Period::Day => 15..=85,
        Period::Week => 120..=350,
        Period::Month => 150..=450,
        Period::Quarter => 450..=1200,
        Period::HalfYear => 900..=2400,
        Period::Year => 1800..=4800,
    }
}

/// Subscription-count range for one synthetic bucket
fn count_range(period: Period) -> RangeInclusive<i64> {
    match period {
        Period::Day => 1..=3,
        Period::Week => 3..=8,
        Period::Month => 5..=12,
        Period::Quarter => 8..=15,
        Period::HalfYear => 10..=20,
        Period::Year => 15..=25,
    }
}

/// A synthetic series ending at the bucket containing `today`, newest first
///
/// Has exactly `period.bucket_limit()` entries, labeled the same way the
/// bucketer labels real payments.
pub fn sample_series<R: Rng + ?Sized>(
    period: Period,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<SpendingPeriodData> {
    let mut start = period_start(today, period);
    let mut series = Vec::with_capacity(period.bucket_limit());

    for _ in 0..period.bucket_limit() {
        series.push(SpendingPeriodData {
            period: period_label(start, period),
            total_amount: rng.gen_range(amount_range(period)) as f64,
            subscription_count: rng.gen_range(count_range(period)),
        });
        start = previous_period_start(start, period);
    }

    series
}

/// Back-fill monthly payments for every active subscription
///
/// For each of the last `months` months, appends one payment per active
/// subscription dated `k` months before `today` (never before the
/// subscription's start date). Amounts carry a ±5% jitter, rounded to cents.
/// Returns the number of payments written.
pub fn generate_payment_history<S, R>(
    store: &S,
    today: NaiveDate,
    months: u32,
    rng: &mut R,
) -> Result<usize>
where
    S: SubscriptionStore + ?Sized,
    R: Rng + ?Sized,
{
    let subscriptions = store.list_active_subscriptions()?;
    let mut written = 0;

    for subscription in &subscriptions {
        for k in 1..=months {
            let Some(date) = today.checked_sub_months(Months::new(k)) else {
                break;
            };
            if date < subscription.start_date {
                break;
            }

            let jitter: f64 = rng.gen_range(-0.05..=0.05);
            let amount = (subscription.price * (1.0 + jitter) * 100.0).round() / 100.0;
            store.insert_payment(&PaymentHistory::new(
                subscription.id.clone(),
                amount,
                date,
                subscription.currency.clone(),
            ))?;
            written += 1;
        }
    }

    info!(
        subscriptions = subscriptions.len(),
        payments = written,
        "Generated demo payment history"
    );
    Ok(written)
}
