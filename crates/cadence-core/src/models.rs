//! Domain models for Cadence

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default currency label for new subscriptions and payments
pub const DEFAULT_CURRENCY: &str = "USD";

/// A tracked subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Three-letter currency label. Stored, never converted.
    pub currency: String,
    pub billing_interval: BillingInterval,
    /// Only meaningful for `BillingInterval::Custom`
    pub custom_interval_days: i64,
    pub start_date: NaiveDate,
    /// Derived from `start_date` and the interval; see `billing::next_billing_date`
    pub next_billing_date: NaiveDate,
    pub is_active: bool,
    pub icon_url: Option<String>,
    pub category: Category,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a subscription
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub billing_interval: BillingInterval,
    pub custom_interval_days: i64,
    pub start_date: NaiveDate,
    pub category: Category,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub is_active: bool,
}

impl NewSubscription {
    /// A new active subscription in the default currency, category `Other`
    pub fn new(
        name: impl Into<String>,
        price: f64,
        billing_interval: BillingInterval,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            currency: DEFAULT_CURRENCY.to_string(),
            billing_interval,
            custom_interval_days: 0,
            start_date,
            category: Category::Other,
            description: None,
            icon_url: None,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_custom_days(mut self, days: i64) -> Self {
        self.custom_interval_days = days;
        self
    }
}

/// Partial update for an existing subscription. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub billing_interval: Option<BillingInterval>,
    pub custom_interval_days: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub category: Option<Category>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl SubscriptionUpdate {
    /// Whether applying this update to `current` changes its billing cadence
    ///
    /// Re-submitting the stored interval, custom days or start date is not a change.
    pub fn changes_schedule(&self, current: &Subscription) -> bool {
        self.billing_interval
            .is_some_and(|i| i != current.billing_interval)
            || self
                .custom_interval_days
                .is_some_and(|d| d != current.custom_interval_days)
            || self.start_date.is_some_and(|d| d != current.start_date)
    }
}

/// Subscription billing cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
            Self::Custom => "Custom",
        }
    }

    pub fn all() -> &'static [BillingInterval] {
        &[
            Self::Weekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Yearly,
            Self::Custom,
        ]
    }
}

impl std::str::FromStr for BillingInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "Unknown billing interval: {} (valid: weekly, monthly, quarterly, yearly, custom)",
                s
            )),
        }
    }
}

/// Fixed subscription categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Entertainment,
    Productivity,
    Health,
    Education,
    Utilities,
    Shopping,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entertainment => "entertainment",
            Self::Productivity => "productivity",
            Self::Health => "health",
            Self::Education => "education",
            Self::Utilities => "utilities",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Entertainment => "Entertainment",
            Self::Productivity => "Productivity",
            Self::Health => "Health & Fitness",
            Self::Education => "Education",
            Self::Utilities => "Utilities",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }

    /// Display color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            Self::Entertainment => "#9C27B0",
            Self::Productivity => "#2196F3",
            Self::Health => "#4CAF50",
            Self::Education => "#FF9800",
            Self::Utilities => "#F44336",
            Self::Shopping => "#E91E63",
            Self::Other => "#607D8B",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Entertainment,
            Self::Productivity,
            Self::Health,
            Self::Education,
            Self::Utilities,
            Self::Shopping,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entertainment" => Ok(Self::Entertainment),
            "productivity" => Ok(Self::Productivity),
            "health" | "health & fitness" => Ok(Self::Health),
            "education" => Ok(Self::Education),
            "utilities" => Ok(Self::Utilities),
            "shopping" => Ok(Self::Shopping),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown category: {} (valid: entertainment, productivity, health, education, utilities, shopping, other)",
                s
            )),
        }
    }
}

/// A single charge, appended once and never edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistory {
    pub id: String,
    /// Weak reference: the subscription may have been deleted since
    pub subscription_id: String,
    pub amount: f64,
    pub payment_date: NaiveDate,
    pub currency: String,
}

impl PaymentHistory {
    pub fn new(
        subscription_id: impl Into<String>,
        amount: f64,
        payment_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subscription_id: subscription_id.into(),
            amount,
            payment_date,
            currency: currency.into(),
        }
    }
}

// ========== Report Models ==========

/// Time granularity for spending series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    Day,
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::HalfYear => "half-year",
            Self::Year => "year",
        }
    }

    /// How many of the newest buckets a series keeps
    pub fn bucket_limit(&self) -> usize {
        match self {
            Self::Day => 30,
            Self::Week => 12,
            Self::Month => 12,
            Self::Quarter => 8,
            Self::HalfYear => 4,
            Self::Year => 5,
        }
    }

    pub fn all() -> &'static [Period] {
        &[
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Quarter,
            Self::HalfYear,
            Self::Year,
        ]
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "quarter" | "quarterly" => Ok(Self::Quarter),
            "half-year" | "half_year" | "halfyear" => Ok(Self::HalfYear),
            "year" | "yearly" => Ok(Self::Year),
            _ => Err(format!(
                "Unknown period: {} (valid: day, week, month, quarter, half-year, year)",
                s
            )),
        }
    }
}

/// One bucket of a spending series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPeriodData {
    /// Bucket label, e.g. `2024-03`, `2024-W09`, `2024-Q1`
    pub period: String,
    pub total_amount: f64,
    /// Distinct subscriptions that paid within the bucket
    pub subscription_count: i64,
}

/// A spending series for one granularity, newest bucket first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingSeries {
    pub period: Period,
    pub data: Vec<SpendingPeriodData>,
    /// True when `data` is synthetic because no payment history exists
    pub is_demo: bool,
}

/// Per-category totals over active subscriptions, as read from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total_amount: f64,
    pub count: i64,
}

/// A category row in the analytics breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: Category,
    /// Raw price sum, whatever each subscription's cadence
    pub total_amount: f64,
    /// Sum of monthly equivalents; the percentage is based on this
    pub monthly_amount: f64,
    pub subscription_count: i64,
    pub percentage: f64,
}

/// A subscription charge falling due soon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingPayment {
    pub subscription: Subscription,
    /// Whole days between today and the billing date
    pub days_until_payment: i64,
    pub amount: f64,
}

/// Direction of recent spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Increasing => "📈",
            Self::Decreasing => "📉",
            Self::Stable => "➡️",
        }
    }
}

/// Full analytics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub generated_on: NaiveDate,
    /// Last 12 month buckets, newest first
    pub monthly_spending: Vec<SpendingPeriodData>,
    pub category_breakdown: Vec<CategorySpending>,
    pub total_monthly_spend: f64,
    /// Always `total_monthly_spend * 12`
    pub total_yearly_spend: f64,
    pub average_subscription_cost: f64,
    pub active_count: i64,
    pub next_payments: Vec<UpcomingPayment>,
    pub spending_trend: SpendingTrend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_round_trip_strings() {
        for interval in BillingInterval::all() {
            let parsed: BillingInterval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, *interval);
        }
        assert!("fortnightly".parse::<BillingInterval>().is_err());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Health.display_name(), "Health & Fitness");
        assert_eq!(Category::Other.color(), "#607D8B");
        assert_eq!("HEALTH".parse::<Category>().unwrap(), Category::Health);
        assert_eq!(Category::all().len(), 7);
    }

    #[test]
    fn test_period_limits() {
        assert_eq!(Period::Day.bucket_limit(), 30);
        assert_eq!(Period::Week.bucket_limit(), 12);
        assert_eq!(Period::Month.bucket_limit(), 12);
        assert_eq!(Period::Quarter.bucket_limit(), 8);
        assert_eq!(Period::Year.bucket_limit(), 5);
        assert_eq!("half-year".parse::<Period>().unwrap(), Period::HalfYear);
    }

    #[test]
    fn test_update_changes_schedule() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let now = Utc::now();
        let current = Subscription {
            id: "sub".into(),
            name: "Netflix".into(),
            price: 15.99,
            currency: DEFAULT_CURRENCY.into(),
            billing_interval: BillingInterval::Monthly,
            custom_interval_days: 0,
            start_date: date,
            next_billing_date: date,
            is_active: true,
            icon_url: None,
            category: Category::Entertainment,
            description: None,
            created_at: now,
            updated_at: now,
        };

        let mut update = SubscriptionUpdate::default();
        assert!(!update.changes_schedule(&current));
        update.price = Some(9.99);
        assert!(!update.changes_schedule(&current));

        // Same values as stored
        update.billing_interval = Some(BillingInterval::Monthly);
        update.start_date = Some(date);
        assert!(!update.changes_schedule(&current));

        update.custom_interval_days = Some(14);
        assert!(update.changes_schedule(&current));

        let weekly = SubscriptionUpdate {
            billing_interval: Some(BillingInterval::Weekly),
            ..Default::default()
        };
        assert!(weekly.changes_schedule(&current));
    }

    #[test]
    fn test_payment_ids_are_unique() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = PaymentHistory::new("sub", 1.0, date, DEFAULT_CURRENCY);
        let b = PaymentHistory::new("sub", 1.0, date, DEFAULT_CURRENCY);
        assert_ne!(a.id, b.id);
    }
}
