//! Subscription list filter
//!
//! Applied in memory over an already-loaded list (typically the active list
//! from `SubscriptionStore::list_active_subscriptions` or its watcher).

use serde::Serialize;

use crate::billing::monthly_equivalent;
use crate::models::{BillingInterval, Category, Subscription};

/// Builder for narrowing a subscription list
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub interval: Option<BillingInterval>,
    /// Empty means every category
    pub categories: Vec<Category>,
    /// Inclusive bounds on the raw price
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Filtered subscriptions plus the monthly spend they represent
#[derive(Debug, Clone, Serialize)]
pub struct FilteredSubscriptions {
    pub subscriptions: Vec<Subscription>,
    pub total_monthly: f64,
}

impl SubscriptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search text (blank text is ignored)
    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        self
    }

    pub fn interval(mut self, interval: Option<BillingInterval>) -> Self {
        self.interval = interval;
        self
    }

    pub fn categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Whether a single subscription passes every set condition
    pub fn matches(&self, subscription: &Subscription) -> bool {
        if let Some(ref query) = self.search {
            if !subscription.name.to_lowercase().contains(query.as_str()) {
                return false;
            }
        }
        if let Some(interval) = self.interval {
            if subscription.billing_interval != interval {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&subscription.category) {
            return false;
        }
        if let Some(min) = self.min_price {
            if subscription.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if subscription.price > max {
                return false;
            }
        }
        true
    }

    /// Keep matching subscriptions in their original order
    pub fn apply(&self, subscriptions: Vec<Subscription>) -> FilteredSubscriptions {
        let subscriptions: Vec<Subscription> = subscriptions
            .into_iter()
            .filter(|s| self.matches(s))
            .collect();
        let total_monthly = subscriptions.iter().map(monthly_equivalent).sum();

        FilteredSubscriptions {
            subscriptions,
            total_monthly,
        }
    }
}
