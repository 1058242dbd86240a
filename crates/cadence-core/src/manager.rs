//! Subscription management use-cases
//!
//! The only place that creates or edits subscriptions. It owns validation
//! and keeps `next_billing_date` derived from the start date and cadence.

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::billing::{has_valid_interval, next_billing_date};
use crate::error::{Error, Result};
use crate::models::{
    BillingInterval, NewSubscription, PaymentHistory, Subscription, SubscriptionUpdate,
};
use crate::store::SubscriptionStore;

/// Subscription use-cases over any store
pub struct SubscriptionManager<'a, S: SubscriptionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SubscriptionStore + ?Sized> SubscriptionManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a new subscription
    pub fn create(&self, new: NewSubscription) -> Result<Subscription> {
        let now = Utc::now();
        let mut subscription = Subscription {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            price: new.price,
            currency: new.currency.trim().to_uppercase(),
            billing_interval: new.billing_interval,
            custom_interval_days: new.custom_interval_days,
            start_date: new.start_date,
            next_billing_date: new.start_date,
            is_active: new.is_active,
            icon_url: new.icon_url.filter(|u| !u.trim().is_empty()),
            category: new.category,
            description: new.description.filter(|d| !d.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        validate(&subscription)?;
        subscription.next_billing_date = next_billing_date(&subscription, subscription.start_date);

        self.store.insert_subscription(&subscription)?;
        info!(
            id = %subscription.id,
            name = %subscription.name,
            next = %subscription.next_billing_date,
            "Created subscription"
        );
        Ok(subscription)
    }

    /// Apply a partial update
    ///
    /// When the interval, custom days or start date actually change, the next
    /// billing date is recomputed from the start date and rolled past the
    /// last recorded payment, so periods already billed are not billed again.
    pub fn update(&self, id: &str, update: SubscriptionUpdate) -> Result<Subscription> {
        let mut subscription = self.get(id)?;
        let reschedule = update.changes_schedule(&subscription);

        if let Some(name) = update.name.as_deref() {
            subscription.name = name.trim().to_string();
        }
        if let Some(price) = update.price {
            subscription.price = price;
        }
        if let Some(currency) = update.currency.as_deref() {
            subscription.currency = currency.trim().to_uppercase();
        }
        if let Some(interval) = update.billing_interval {
            subscription.billing_interval = interval;
        }
        if let Some(days) = update.custom_interval_days {
            subscription.custom_interval_days = days;
        }
        if let Some(start) = update.start_date {
            subscription.start_date = start;
        }
        if let Some(category) = update.category {
            subscription.category = category;
        }
        if let Some(description) = update.description.as_deref() {
            let trimmed = description.trim();
            subscription.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(active) = update.is_active {
            subscription.is_active = active;
        }

        validate(&subscription)?;
        if reschedule {
            subscription.next_billing_date = self.first_unbilled_date(&subscription)?;
        }
        subscription.updated_at = Utc::now();

        self.store.update_subscription(&subscription)?;
        info!(id = %subscription.id, "Updated subscription");
        Ok(subscription)
    }

    /// First due date after the start date that lies past the latest payment
    fn first_unbilled_date(&self, subscription: &Subscription) -> Result<NaiveDate> {
        let mut next = next_billing_date(subscription, subscription.start_date);
        if !has_valid_interval(subscription) {
            return Ok(next);
        }

        // Newest first
        let last_paid = self
            .store
            .payment_history_for(&subscription.id)?
            .first()
            .map(|p| p.payment_date);
        if let Some(last_paid) = last_paid {
            while next <= last_paid {
                next = next_billing_date(subscription, next);
            }
        }
        Ok(next)
    }

    /// Pause or resume a subscription
    pub fn set_active(&self, id: &str, active: bool) -> Result<Subscription> {
        self.update(
            id,
            SubscriptionUpdate {
                is_active: Some(active),
                ..Default::default()
            },
        )
    }

    /// Hard-delete a subscription. Payment history is kept.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_subscription(id)?;
        info!(id, "Deleted subscription");
        Ok(())
    }

    /// Fetch a subscription or fail with `NotFound`
    pub fn get(&self, id: &str) -> Result<Subscription> {
        self.store
            .get_subscription(id)?
            .ok_or_else(|| Error::NotFound(format!("subscription {}", id)))
    }

    /// Record a payment for one subscription now, without moving its schedule
    pub fn record_payment(&self, id: &str, date: NaiveDate) -> Result<PaymentHistory> {
        let subscription = self.get(id)?;
        let payment = PaymentHistory::new(
            subscription.id.clone(),
            subscription.price,
            date,
            subscription.currency.clone(),
        );
        self.store.insert_payment(&payment)?;
        Ok(payment)
    }

    /// Billing event: charge every active subscription that has come due
    ///
    /// Each due date up to and including `today` becomes one payment of the
    /// current price, and `next_billing_date` advances past `today`. The
    /// payments and the advanced date are stored together per subscription.
    /// Subscriptions whose cadence cannot advance are skipped.
    pub fn record_due_payments(&self, today: NaiveDate) -> Result<Vec<PaymentHistory>> {
        let mut recorded = Vec::new();

        for mut subscription in self.store.list_active_subscriptions()? {
            if subscription.next_billing_date > today {
                continue;
            }
            if !has_valid_interval(&subscription) {
                warn!(
                    id = %subscription.id,
                    name = %subscription.name,
                    "Skipping billing for subscription with invalid custom interval"
                );
                continue;
            }

            let mut payments = Vec::new();
            while subscription.next_billing_date <= today {
                payments.push(PaymentHistory::new(
                    subscription.id.clone(),
                    subscription.price,
                    subscription.next_billing_date,
                    subscription.currency.clone(),
                ));
                subscription.next_billing_date =
                    next_billing_date(&subscription, subscription.next_billing_date);
            }

            subscription.updated_at = Utc::now();
            self.store.record_billing(&subscription, &payments)?;
            recorded.extend(payments);
        }

        if !recorded.is_empty() {
            info!(payments = recorded.len(), "Recorded due payments");
        }
        Ok(recorded)
    }
}

/// Field rules enforced before anything reaches the store
pub fn validate(subscription: &Subscription) -> Result<()> {
    if subscription.name.trim().is_empty() {
        return Err(Error::InvalidData("Subscription name cannot be empty".into()));
    }
    if !subscription.price.is_finite() || subscription.price <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Price must be a positive amount, got {}",
            subscription.price
        )));
    }
    if subscription.billing_interval == BillingInterval::Custom
        && subscription.custom_interval_days <= 0
    {
        return Err(Error::InvalidData(
            "Custom interval must be a positive number of days".into(),
        ));
    }
    let currency = &subscription.currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidData(format!(
            "Currency must be a three-letter code, got '{}'",
            currency
        )));
    }
    Ok(())
}
