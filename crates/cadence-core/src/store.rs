//! Storage contract used by analytics, reminders and subscription management

use chrono::NaiveDate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{CategoryTotal, PaymentHistory, Period, SpendingPeriodData, Subscription};

/// Persistence operations the core depends on
///
/// `Database` is the production implementation. Ordering guarantees are part
/// of the contract.
pub trait SubscriptionStore {
    /// Active subscriptions, ordered by next billing date ascending
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>>;

    /// All subscriptions, most recently updated first
    fn list_all_subscriptions(&self) -> Result<Vec<Subscription>>;

    fn get_subscription(&self, id: &str) -> Result<Option<Subscription>>;

    fn insert_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Returns `Error::NotFound` when no row has the subscription's id
    fn update_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Returns `Error::NotFound` when no row has `id`
    fn delete_subscription(&self, id: &str) -> Result<()>;

    /// Active subscriptions due within `[start, end]`
    fn subscriptions_due_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Subscription>>;

    /// Raw price totals per category over active subscriptions
    fn category_spending_summary(&self) -> Result<Vec<CategoryTotal>>;

    fn insert_payment(&self, payment: &PaymentHistory) -> Result<()>;

    /// Append `payments` and store the advanced subscription atomically
    fn record_billing(
        &self,
        subscription: &Subscription,
        payments: &[PaymentHistory],
    ) -> Result<()>;

    /// Payments for one subscription, newest first
    fn payment_history_for(&self, subscription_id: &str) -> Result<Vec<PaymentHistory>>;

    /// All payments, newest first
    fn list_payments(&self) -> Result<Vec<PaymentHistory>>;

    fn count_payments(&self) -> Result<i64>;

    /// Bucketed spending, newest bucket first, capped per period
    fn spending_history(&self, period: Period) -> Result<Vec<SpendingPeriodData>>;

    /// Returns the number of payments removed
    fn clear_all_payment_history(&self) -> Result<usize>;
}

impl SubscriptionStore for Database {
    fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        Database::list_active_subscriptions(self)
    }

    fn list_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        Database::list_all_subscriptions(self)
    }

    fn get_subscription(&self, id: &str) -> Result<Option<Subscription>> {
        Database::get_subscription(self, id)
    }

    fn insert_subscription(&self, subscription: &Subscription) -> Result<()> {
        Database::insert_subscription(self, subscription)
    }

    fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        Database::update_subscription(self, subscription)
    }

    fn delete_subscription(&self, id: &str) -> Result<()> {
        Database::delete_subscription(self, id)
    }

    fn subscriptions_due_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Subscription>> {
        Database::subscriptions_due_between(self, start, end)
    }

    fn category_spending_summary(&self) -> Result<Vec<CategoryTotal>> {
        Database::category_spending_summary(self)
    }

    fn insert_payment(&self, payment: &PaymentHistory) -> Result<()> {
        Database::insert_payment(self, payment)
    }

    fn record_billing(
        &self,
        subscription: &Subscription,
        payments: &[PaymentHistory],
    ) -> Result<()> {
        Database::record_billing(self, subscription, payments)
    }

    fn payment_history_for(&self, subscription_id: &str) -> Result<Vec<PaymentHistory>> {
        Database::payment_history_for(self, subscription_id)
    }

    fn list_payments(&self) -> Result<Vec<PaymentHistory>> {
        Database::list_payments(self)
    }

    fn count_payments(&self) -> Result<i64> {
        Database::count_payments(self)
    }

    fn spending_history(&self, period: Period) -> Result<Vec<SpendingPeriodData>> {
        Database::spending_history(self, period)
    }

    fn clear_all_payment_history(&self) -> Result<usize> {
        Database::clear_all_payment_history(self)
    }
}
