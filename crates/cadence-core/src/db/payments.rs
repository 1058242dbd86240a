//! Payment history operations

use rusqlite::{params, Row};
use tracing::{debug, info};

use super::subscriptions::update_subscription_row;
use super::{parse_date, Database};
use crate::buckets::bucket_payments;
use crate::error::{Error, Result};
use crate::models::{PaymentHistory, Period, SpendingPeriodData, Subscription};

fn row_to_payment(row: &Row) -> rusqlite::Result<PaymentHistory> {
    let date_str: String = row.get(3)?;
    Ok(PaymentHistory {
        id: row.get(0)?,
        subscription_id: row.get(1)?,
        amount: row.get(2)?,
        payment_date: parse_date(&date_str)?,
        currency: row.get(4)?,
    })
}

impl Database {
    /// Append a payment
    pub fn insert_payment(&self, payment: &PaymentHistory) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO payment_history (id, subscription_id, amount, payment_date, currency)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                payment.id,
                payment.subscription_id,
                payment.amount,
                payment.payment_date.to_string(),
                payment.currency,
            ],
        )?;
        drop(conn);

        debug!(subscription = %payment.subscription_id, amount = payment.amount, "Recorded payment");
        self.notify_changed();
        Ok(())
    }

    /// Append many payments in one transaction
    pub fn insert_payments(&self, payments: &[PaymentHistory]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO payment_history (id, subscription_id, amount, payment_date, currency)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )?;
            for payment in payments {
                stmt.execute(params![
                    payment.id,
                    payment.subscription_id,
                    payment.amount,
                    payment.payment_date.to_string(),
                    payment.currency,
                ])?;
            }
        }
        tx.commit()?;
        drop(conn);

        if !payments.is_empty() {
            self.notify_changed();
        }
        Ok(payments.len())
    }

    /// Billing event for one subscription in a single transaction
    ///
    /// Appends `payments` and stores the advanced `subscription`. Nothing is
    /// written if the subscription no longer exists.
    pub fn record_billing(
        &self,
        subscription: &Subscription,
        payments: &[PaymentHistory],
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO payment_history (id, subscription_id, amount, payment_date, currency)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )?;
            for payment in payments {
                stmt.execute(params![
                    payment.id,
                    payment.subscription_id,
                    payment.amount,
                    payment.payment_date.to_string(),
                    payment.currency,
                ])?;
            }
        }
        if update_subscription_row(&tx, subscription)? == 0 {
            return Err(Error::NotFound(format!("subscription {}", subscription.id)));
        }
        tx.commit()?;
        drop(conn);

        debug!(
            subscription = %subscription.id,
            payments = payments.len(),
            next = %subscription.next_billing_date,
            "Recorded billing"
        );
        self.notify_changed();
        Ok(())
    }

    /// Payments for one subscription, newest first
    pub fn payment_history_for(&self, subscription_id: &str) -> Result<Vec<PaymentHistory>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, subscription_id, amount, payment_date, currency
            FROM payment_history
            WHERE subscription_id = ?
            ORDER BY payment_date DESC
            "#,
        )?;

        let payments = stmt
            .query_map(params![subscription_id], row_to_payment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    /// Every payment, newest first
    pub fn list_payments(&self) -> Result<Vec<PaymentHistory>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, subscription_id, amount, payment_date, currency
            FROM payment_history
            ORDER BY payment_date DESC
            "#,
        )?;

        let payments = stmt
            .query_map([], row_to_payment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(payments)
    }

    /// Number of stored payments
    pub fn count_payments(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM payment_history", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Bucketed spending for a period, newest bucket first
    ///
    /// All six granularities share one raw scan grouped in memory.
    pub fn spending_history(&self, period: Period) -> Result<Vec<SpendingPeriodData>> {
        let payments = self.list_payments()?;
        Ok(bucket_payments(&payments, period))
    }

    /// Remove all payment history (maintenance)
    pub fn clear_all_payment_history(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM payment_history", [])?;
        drop(conn);

        info!(deleted, "Cleared payment history");
        self.notify_changed();
        Ok(deleted)
    }
}
