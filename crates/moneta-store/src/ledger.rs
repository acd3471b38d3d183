//! SQLite notification ledger — the idempotency guard for reminder delivery.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;

use moneta_scheduler::repo::NotificationLedger;

use crate::error::Result;

pub struct SqliteLedger {
    db: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    fn was_notified_inner(&self, key: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let exists: bool = db.query_row(
            "SELECT EXISTS(SELECT 1 FROM notification_log WHERE key = ?1)",
            [key],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// `INSERT OR IGNORE` makes duplicate marks from overlapping cycles a
    /// silent no-op — the first writer wins and the record is never touched
    /// again.
    fn mark_notified_inner(&self, key: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO notification_log (key, created_at) VALUES (?1, ?2)",
            rusqlite::params![key, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl NotificationLedger for SqliteLedger {
    fn was_notified(&self, key: &str) -> moneta_scheduler::Result<bool> {
        Ok(self.was_notified_inner(key)?)
    }

    fn mark_notified(&self, key: &str) -> moneta_scheduler::Result<()> {
        Ok(self.mark_notified_inner(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> SqliteLedger {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SqliteLedger::new(conn)
    }

    #[test]
    fn absent_key_means_not_notified() {
        assert!(!ledger().was_notified_inner("p-1:2026-03-01T09:00").unwrap());
    }

    #[test]
    fn mark_then_check_is_true() {
        let l = ledger();
        l.mark_notified_inner("p-1:2026-03-01T09:00").unwrap();
        assert!(l.was_notified_inner("p-1:2026-03-01T09:00").unwrap());
        assert!(!l.was_notified_inner("p-1:2026-03-01T09:01").unwrap());
    }

    #[test]
    fn duplicate_mark_is_not_an_error() {
        let l = ledger();
        l.mark_notified_inner("k").unwrap();
        l.mark_notified_inner("k").unwrap();
        assert!(l.was_notified_inner("k").unwrap());
    }
}
