//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `subscriptions` - Subscription CRUD, due-date and category queries
//! - `payments` - Append-only payment history and bucketed spending history
//!
//! Every write bumps a change generation published on a `tokio::sync::watch`
//! channel, which backs `watch_active_subscriptions`.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Subscription;

mod payments;
mod subscriptions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "CADENCE_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"cadence-salt-v01";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Format a timestamp for storage (fixed width, so text order is time order)
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored `YYYY-MM-DD` date
pub(crate) fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Write generation, bumped after every mutation
    changes: Arc<watch::Sender<u64>>,
    /// Owns the directory of a throwaway database; removed with the last clone
    _temp_dir: Option<Arc<tempfile::TempDir>>,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `CADENCE_DB_KEY` environment variable to be set.
    /// The database will be encrypted using SQLCipher with a key derived
    /// from the passphrase via Argon2.
    ///
    /// Returns an error if `CADENCE_DB_KEY` is not set. Use `new_unencrypted()`
    /// for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for real data).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: This creates an unencrypted database. Only use for development
    /// or testing.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let (changes, _) = watch::channel(0);
        let db = Self {
            pool,
            db_path: path.to_string(),
            changes: Arc::new(changes),
            _temp_dir: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a file in a fresh temporary directory rather than `:memory:`
    /// because every pooled connection would otherwise see its own empty
    /// database. The directory, WAL files included, is deleted when the last
    /// clone is dropped.
    pub fn in_memory() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("cadence_test_").tempdir()?;
        let path = dir.path().join("cadence.db").to_string_lossy().to_string();

        let mut db = Self::new_unencrypted(&path)?;
        db._temp_dir = Some(Arc::new(dir));
        Ok(db)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        // SQLCipher sets cipher_version if encryption is active
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Current write generation
    pub fn generation(&self) -> u64 {
        *self.changes.borrow()
    }

    /// Publish a change to every watcher
    pub(crate) fn notify_changed(&self) {
        self.changes.send_modify(|generation| *generation += 1);
        debug!(generation = self.generation(), "Database changed");
    }

    /// Watch the active subscription list
    ///
    /// The returned watcher yields a fresh list after every write.
    pub fn watch_active_subscriptions(&self) -> ActiveSubscriptionsWatch {
        ActiveSubscriptionsWatch {
            db: self.clone(),
            rx: self.changes.subscribe(),
        }
    }

    /// Soft reset: remove all subscriptions and payment history
    pub fn soft_reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            DELETE FROM payment_history;
            DELETE FROM subscriptions;
            "#,
        )?;
        self.notify_changed();

        info!("Database soft reset complete");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers
            -- Note: creates -wal and -shm sidecar files alongside the database
            PRAGMA journal_mode = WAL;
            PRAGMA cache_size = 2000;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Subscriptions (user-managed recurring charges)
            CREATE TABLE IF NOT EXISTS subscriptions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD',
                billing_interval TEXT NOT NULL,          -- weekly, monthly, quarterly, yearly, custom
                custom_interval_days INTEGER NOT NULL DEFAULT 0,
                start_date DATE NOT NULL,
                next_billing_date DATE NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                icon_url TEXT,
                category TEXT NOT NULL DEFAULT 'other',
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_subscriptions_active ON subscriptions(is_active);
            CREATE INDEX IF NOT EXISTS idx_subscriptions_next_billing ON subscriptions(next_billing_date);
            CREATE INDEX IF NOT EXISTS idx_subscriptions_category ON subscriptions(category);

            -- Payment history (append-only; no foreign key so history outlives deletes)
            CREATE TABLE IF NOT EXISTS payment_history (
                id TEXT PRIMARY KEY,
                subscription_id TEXT NOT NULL,
                amount REAL NOT NULL,
                payment_date DATE NOT NULL,
                currency TEXT NOT NULL DEFAULT 'USD'
            );

            CREATE INDEX IF NOT EXISTS idx_payment_history_subscription ON payment_history(subscription_id);
            CREATE INDEX IF NOT EXISTS idx_payment_history_date ON payment_history(payment_date);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Live view of the active subscription list
pub struct ActiveSubscriptionsWatch {
    db: Database,
    rx: watch::Receiver<u64>,
}

impl ActiveSubscriptionsWatch {
    /// The list as it is now
    pub fn current(&mut self) -> Result<Vec<Subscription>> {
        self.rx.borrow_and_update();
        self.db.list_active_subscriptions()
    }

    /// Wait for the next write, then return the fresh list
    pub async fn changed(&mut self) -> Result<Vec<Subscription>> {
        self.rx.changed().await.map_err(|_| Error::WatchClosed)?;
        self.db.list_active_subscriptions()
    }
}
