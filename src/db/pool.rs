//! SQLite connection wrapper. Every request handler opens its own `DbPool`;
//! concurrent writers are serialized by SQLite's database write lock.

use crate::config::Config;
use rusqlite::{Connection, Result, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::with_busy_timeout(&cfg.database, cfg.busy_timeout_ms)
    }

    pub fn with_busy_timeout(path: &str, busy_timeout_ms: u64) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Start a transaction that takes the write lock up front, so that the
    /// reads it performs cannot go stale before its own write.
    pub fn write_tx(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
    }
}
