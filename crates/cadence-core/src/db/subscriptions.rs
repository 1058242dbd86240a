//! Subscription operations

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{format_datetime, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{BillingInterval, Category, CategoryTotal, Subscription};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, name, price, currency, billing_interval, custom_interval_days, start_date,
    next_billing_date, is_active, icon_url, category, description, created_at, updated_at
"#;

/// Map a row selected with `SUBSCRIPTION_COLUMNS`
fn row_to_subscription(row: &Row) -> rusqlite::Result<Subscription> {
    let interval_str: String = row.get(4)?;
    let start_str: String = row.get(6)?;
    let next_str: String = row.get(7)?;
    let category_str: String = row.get(10)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Subscription {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        currency: row.get(3)?,
        billing_interval: parse_column::<BillingInterval>(4, &interval_str)?,
        custom_interval_days: row.get(5)?,
        start_date: parse_date(&start_str)?,
        next_billing_date: parse_date(&next_str)?,
        is_active: row.get(8)?,
        icon_url: row.get(9)?,
        // Unknown categories fall back to Other rather than hiding the row
        category: category_str.parse().unwrap_or(Category::Other),
        description: row.get(11)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn parse_column<T: std::str::FromStr<Err = String>>(idx: usize, s: &str) -> rusqlite::Result<T> {
    s.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(Error::InvalidData(e)),
        )
    })
}

/// Overwrite every mutable column, returning the number of rows touched
pub(super) fn update_subscription_row(
    conn: &Connection,
    subscription: &Subscription,
) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE subscriptions SET
            name = ?, price = ?, currency = ?, billing_interval = ?, custom_interval_days = ?,
            start_date = ?, next_billing_date = ?, is_active = ?, icon_url = ?, category = ?,
            description = ?, updated_at = ?
        WHERE id = ?
        "#,
        params![
            subscription.name,
            subscription.price,
            subscription.currency,
            subscription.billing_interval.as_str(),
            subscription.custom_interval_days,
            subscription.start_date.to_string(),
            subscription.next_billing_date.to_string(),
            subscription.is_active,
            subscription.icon_url,
            subscription.category.as_str(),
            subscription.description,
            format_datetime(&subscription.updated_at),
            subscription.id,
        ],
    )
}

impl Database {
    /// Insert a fully-formed subscription
    pub fn insert_subscription(&self, subscription: &Subscription) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO subscriptions (
                id, name, price, currency, billing_interval, custom_interval_days, start_date,
                next_billing_date, is_active, icon_url, category, description, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                subscription.id,
                subscription.name,
                subscription.price,
                subscription.currency,
                subscription.billing_interval.as_str(),
                subscription.custom_interval_days,
                subscription.start_date.to_string(),
                subscription.next_billing_date.to_string(),
                subscription.is_active,
                subscription.icon_url,
                subscription.category.as_str(),
                subscription.description,
                format_datetime(&subscription.created_at),
                format_datetime(&subscription.updated_at),
            ],
        )?;
        drop(conn);

        debug!(id = %subscription.id, name = %subscription.name, "Inserted subscription");
        self.notify_changed();
        Ok(())
    }

    /// Overwrite every mutable column of an existing subscription
    pub fn update_subscription(&self, subscription: &Subscription) -> Result<()> {
        let conn = self.conn()?;
        let updated = update_subscription_row(&conn, subscription)?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("subscription {}", subscription.id)));
        }
        self.notify_changed();
        Ok(())
    }

    /// Hard-delete a subscription. Its payment history is kept.
    pub fn delete_subscription(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions WHERE id = ?", params![id])?;
        drop(conn);

        if deleted == 0 {
            return Err(Error::NotFound(format!("subscription {}", id)));
        }
        self.notify_changed();
        Ok(())
    }

    /// Get a subscription by ID
    pub fn get_subscription(&self, id: &str) -> Result<Option<Subscription>> {
        let conn = self.conn()?;
        let query = format!("SELECT {} FROM subscriptions WHERE id = ?", SUBSCRIPTION_COLUMNS);
        let subscription = conn
            .query_row(&query, params![id], row_to_subscription)
            .optional()?;
        Ok(subscription)
    }

    /// Active subscriptions, soonest charge first
    pub fn list_active_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.query_subscriptions(
            "WHERE is_active = 1 ORDER BY next_billing_date ASC, name ASC",
            params![],
        )
    }

    /// All subscriptions, most recently changed first
    pub fn list_all_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.query_subscriptions("ORDER BY updated_at DESC, name ASC", params![])
    }

    /// Active subscriptions with a charge due in `[start, end]` (inclusive)
    pub fn subscriptions_due_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Subscription>> {
        self.query_subscriptions(
            r#"
            WHERE is_active = 1 AND next_billing_date >= ? AND next_billing_date <= ?
            ORDER BY next_billing_date ASC, name ASC
            "#,
            params![start.to_string(), end.to_string()],
        )
    }

    /// Sum of raw price and count per category, active subscriptions only
    pub fn category_spending_summary(&self) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(price) AS total, COUNT(*) AS count
            FROM subscriptions
            WHERE is_active = 1
            GROUP BY category
            ORDER BY total DESC
            "#,
        )?;

        let totals = stmt
            .query_map([], |row| {
                let category_str: String = row.get(0)?;
                Ok(CategoryTotal {
                    category: category_str.parse().unwrap_or(Category::Other),
                    total_amount: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Count subscriptions: (total, active)
    pub fn count_subscriptions(&self) -> Result<(i64, i64)> {
        let conn = self.conn()?;
        let counts = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM subscriptions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(counts)
    }

    fn query_subscriptions(
        &self,
        clause: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;
        let query = format!("SELECT {} FROM subscriptions {}", SUBSCRIPTION_COLUMNS, clause);
        let mut stmt = conn.prepare(&query)?;

        let subscriptions = stmt
            .query_map(params, row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }
}
