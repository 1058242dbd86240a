//! Analytics aggregator
//!
//! Reads the store, runs the billing normalizer, bucketer and trend
//! classifier, and returns immutable snapshots. Nothing is cached: every
//! call re-reads storage. `today` is always passed in so results are
//! reproducible.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rand::Rng;
use tracing::debug;

use crate::billing::monthly_equivalent;
use crate::demo::sample_series;
use crate::error::Result;
use crate::models::{
    AnalyticsData, Category, CategorySpending, Period, SpendingSeries, Subscription,
    UpcomingPayment,
};
use crate::store::SubscriptionStore;
use crate::trend::classify_series;

/// Horizon for `AnalyticsData::next_payments`
pub const NEXT_PAYMENTS_DAYS: i64 = 30;

/// Compute the full analytics snapshot
pub fn compute_analytics<S: SubscriptionStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> Result<AnalyticsData> {
    let active = store.list_active_subscriptions()?;
    let monthly_spending = store.spending_history(Period::Month)?;

    let total_monthly_spend = total_monthly(&active);
    let active_count = active.len() as i64;
    let average_subscription_cost = if active_count > 0 {
        total_monthly_spend / active_count as f64
    } else {
        0.0
    };

    let category_breakdown = category_breakdown(store, &active, total_monthly_spend)?;
    let next_payments = upcoming_payments(store, today, NEXT_PAYMENTS_DAYS)?;
    let spending_trend = classify_series(&monthly_spending);

    debug!(
        active = active_count,
        monthly = total_monthly_spend,
        trend = spending_trend.as_str(),
        "Computed analytics"
    );

    Ok(AnalyticsData {
        generated_on: today,
        monthly_spending,
        category_breakdown,
        total_monthly_spend,
        total_yearly_spend: total_monthly_spend * 12.0,
        average_subscription_cost,
        active_count,
        next_payments,
        spending_trend,
    })
}

/// Sum of normalized monthly cost
pub fn total_monthly(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(monthly_equivalent).sum()
}

/// Active subscriptions due within `days` of `today`, soonest first
///
/// Ties on the day are broken by name.
pub fn upcoming_payments<S: SubscriptionStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<UpcomingPayment>> {
    let end = today
        .checked_add_signed(Duration::days(days.max(0)))
        .unwrap_or(today);

    let mut upcoming: Vec<UpcomingPayment> = store
        .subscriptions_due_between(today, end)?
        .into_iter()
        .map(|subscription| UpcomingPayment {
            days_until_payment: (subscription.next_billing_date - today).num_days(),
            amount: subscription.price,
            subscription,
        })
        .collect();

    upcoming.sort_by(|a, b| {
        a.days_until_payment
            .cmp(&b.days_until_payment)
            .then_with(|| a.subscription.name.cmp(&b.subscription.name))
    });
    Ok(upcoming)
}

/// Bucketed spending for a period
///
/// With no payment history at all, returns a synthetic series flagged
/// `is_demo`. Real data is never mixed with synthetic data.
pub fn spending_by_period<S, R>(
    store: &S,
    period: Period,
    today: NaiveDate,
    rng: &mut R,
) -> Result<SpendingSeries>
where
    S: SubscriptionStore + ?Sized,
    R: Rng + ?Sized,
{
    if store.count_payments()? == 0 {
        debug!(period = period.as_str(), "No payment history, using demo series");
        return Ok(SpendingSeries {
            period,
            data: sample_series(period, today, rng),
            is_demo: true,
        });
    }

    Ok(SpendingSeries {
        period,
        data: store.spending_history(period)?,
        is_demo: false,
    })
}

/// Percentage share per category of the normalized monthly total
///
/// `total_amount` stays the raw price sum read from storage, while the
/// percentage uses each category's monthly equivalent so the shares add up
/// to 100 across mixed cadences. Percentages are 0 when the total is 0.
fn category_breakdown<S: SubscriptionStore + ?Sized>(
    store: &S,
    active: &[Subscription],
    total_monthly_spend: f64,
) -> Result<Vec<CategorySpending>> {
    let mut monthly_by_category: HashMap<Category, f64> = HashMap::new();
    for subscription in active {
        *monthly_by_category.entry(subscription.category).or_default() +=
            monthly_equivalent(subscription);
    }

    let breakdown = store
        .category_spending_summary()?
        .into_iter()
        .map(|total| {
            let monthly_amount = monthly_by_category
                .get(&total.category)
                .copied()
                .unwrap_or(0.0);
            CategorySpending {
                category: total.category,
                total_amount: total.total_amount,
                monthly_amount,
                subscription_count: total.count,
                percentage: if total_monthly_spend > 0.0 {
                    monthly_amount / total_monthly_spend * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();
    Ok(breakdown)
}
