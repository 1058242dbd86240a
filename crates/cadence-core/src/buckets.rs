//! Period bucketer
//!
//! Groups dated payments into calendar-aligned buckets for one of six
//! granularities. Bucket labels come from the payment date alone, so the
//! same history always produces the same labels.
//!
//! | Period    | Label        | Kept |
//! |-----------|--------------|------|
//! | Day       | `2024-03-05` | 30   |
//! | Week      | `2024-W09`   | 12   |
//! | Month     | `2024-03`    | 12   |
//! | Quarter   | `2024-Q1`    | 8    |
//! | Half-year | `2024-H1`    | 4    |
//! | Year      | `2024`       | 5    |
//!
//! Weeks follow ISO 8601: Monday start, labeled with the ISO week-year.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{PaymentHistory, Period, SpendingPeriodData};

/// First day of the bucket containing `date`
pub fn period_start(date: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Day => date,
        Period::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Period::Month => first_of_month(date.year(), date.month()).unwrap_or(date),
        Period::Quarter => {
            let month = (date.month() - 1) / 3 * 3 + 1;
            first_of_month(date.year(), month).unwrap_or(date)
        }
        Period::HalfYear => {
            let month = if date.month() <= 6 { 1 } else { 7 };
            first_of_month(date.year(), month).unwrap_or(date)
        }
        Period::Year => first_of_month(date.year(), 1).unwrap_or(date),
    }
}

/// Start of the bucket immediately before the one starting at `start`
pub fn previous_period_start(start: NaiveDate, period: Period) -> NaiveDate {
    let stepped = match period {
        Period::Day => start.checked_sub_signed(Duration::days(1)),
        Period::Week => start.checked_sub_signed(Duration::days(7)),
        Period::Month => start.checked_sub_months(Months::new(1)),
        Period::Quarter => start.checked_sub_months(Months::new(3)),
        Period::HalfYear => start.checked_sub_months(Months::new(6)),
        Period::Year => start.checked_sub_months(Months::new(12)),
    };
    period_start(stepped.unwrap_or(NaiveDate::MIN), period)
}

/// Label of the bucket containing `date`
pub fn period_label(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Day => date.format("%Y-%m-%d").to_string(),
        Period::Week => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        Period::Month => date.format("%Y-%m").to_string(),
        Period::Quarter => format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
        Period::HalfYear => format!("{}-H{}", date.year(), if date.month() <= 6 { 1 } else { 2 }),
        Period::Year => date.year().to_string(),
    }
}

/// Bucket payments for a period, newest bucket first, capped at the period's limit
///
/// Empty buckets are omitted. `subscription_count` is the number of distinct
/// subscriptions that paid within the bucket.
pub fn bucket_payments(payments: &[PaymentHistory], period: Period) -> Vec<SpendingPeriodData> {
    let mut buckets: BTreeMap<NaiveDate, (f64, HashSet<&str>)> = BTreeMap::new();

    for payment in payments {
        let start = period_start(payment.payment_date, period);
        let entry = buckets.entry(start).or_insert_with(|| (0.0, HashSet::new()));
        entry.0 += payment.amount;
        entry.1.insert(payment.subscription_id.as_str());
    }

    buckets
        .into_iter()
        .rev()
        .take(period.bucket_limit())
        .map(|(start, (total, subscriptions))| SpendingPeriodData {
            period: period_label(start, period),
            total_amount: total,
            subscription_count: subscriptions.len() as i64,
        })
        .collect()
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(sub: &str, amount: f64, on: NaiveDate) -> PaymentHistory {
        PaymentHistory::new(sub, amount, on, "USD")
    }

    #[test]
    fn test_labels() {
        let d = date(2024, 3, 5);
        assert_eq!(period_label(d, Period::Day), "2024-03-05");
        assert_eq!(period_label(d, Period::Week), "2024-W10");
        assert_eq!(period_label(d, Period::Month), "2024-03");
        assert_eq!(period_label(d, Period::Quarter), "2024-Q1");
        assert_eq!(period_label(d, Period::HalfYear), "2024-H1");
        assert_eq!(period_label(d, Period::Year), "2024");

        let autumn = date(2024, 10, 1);
        assert_eq!(period_label(autumn, Period::Quarter), "2024-Q4");
        assert_eq!(period_label(autumn, Period::HalfYear), "2024-H2");
    }

    #[test]
    fn test_iso_week_uses_iso_year() {
        // Dec 30 2024 is a Monday in ISO week 1 of 2025
        assert_eq!(period_label(date(2024, 12, 30), Period::Week), "2025-W01");
        // Jan 1 2021 is a Friday in ISO week 53 of 2020
        assert_eq!(period_label(date(2021, 1, 1), Period::Week), "2020-W53");
        assert_eq!(period_label(date(2024, 1, 1), Period::Week), "2024-W01");
    }

    #[test]
    fn test_period_start() {
        let d = date(2024, 8, 15); // Thursday
        assert_eq!(period_start(d, Period::Week), date(2024, 8, 12));
        assert_eq!(period_start(d, Period::Month), date(2024, 8, 1));
        assert_eq!(period_start(d, Period::Quarter), date(2024, 7, 1));
        assert_eq!(period_start(d, Period::HalfYear), date(2024, 7, 1));
        assert_eq!(period_start(d, Period::Year), date(2024, 1, 1));
    }

    #[test]
    fn test_previous_period_start() {
        assert_eq!(
            previous_period_start(date(2024, 1, 1), Period::Month),
            date(2023, 12, 1)
        );
        assert_eq!(
            previous_period_start(date(2024, 1, 1), Period::HalfYear),
            date(2023, 7, 1)
        );
        assert_eq!(
            previous_period_start(date(2024, 3, 4), Period::Week),
            date(2024, 2, 26)
        );
    }

    #[test]
    fn test_bucket_sums_and_counts() {
        let payments = vec![
            payment("a", 10.0, date(2024, 1, 5)),
            payment("b", 5.0, date(2024, 1, 20)),
            payment("a", 10.0, date(2024, 1, 28)),
            payment("a", 12.0, date(2024, 3, 5)),
        ];

        let months = bucket_payments(&payments, Period::Month);
        assert_eq!(months.len(), 2);
        // Newest first, February omitted
        assert_eq!(months[0].period, "2024-03");
        assert_eq!(months[0].total_amount, 12.0);
        assert_eq!(months[0].subscription_count, 1);
        assert_eq!(months[1].period, "2024-01");
        assert_eq!(months[1].total_amount, 25.0);
        assert_eq!(months[1].subscription_count, 2);

        let quarters = bucket_payments(&payments, Period::Quarter);
        assert_eq!(quarters.len(), 1);
        assert_eq!(quarters[0].total_amount, 37.0);
    }

    #[test]
    fn test_bucket_cap_keeps_newest() {
        let start = date(2020, 1, 15);
        let payments: Vec<_> = (0..40)
            .map(|i| payment("a", 1.0, start.checked_add_months(Months::new(i)).unwrap()))
            .collect();

        let months = bucket_payments(&payments, Period::Month);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].period, "2023-04");
        assert_eq!(months[11].period, "2022-05");

        let halves = bucket_payments(&payments, Period::HalfYear);
        assert_eq!(halves.len(), 4);
        assert_eq!(halves[0].period, "2023-H1");

        let years = bucket_payments(&payments, Period::Year);
        assert_eq!(years.len(), 4);
        assert_eq!(years[0].period, "2023");
        assert_eq!(years[0].total_amount, 4.0);
    }

    #[test]
    fn test_week_ordering_across_year_boundary() {
        let payments = vec![
            payment("a", 1.0, date(2024, 12, 23)),
            payment("a", 2.0, date(2024, 12, 31)),
        ];
        let weeks = bucket_payments(&payments, Period::Week);
        assert_eq!(weeks[0].period, "2025-W01");
        assert_eq!(weeks[1].period, "2024-W52");
    }

    #[test]
    fn test_empty_history() {
        assert!(bucket_payments(&[], Period::Day).is_empty());
    }
}
