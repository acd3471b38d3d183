//! SQLite push-subscription directory.
//!
//! Registrations are created by the gateway's subscribe endpoint (the web
//! frontend posts the browser's PushSubscription there) and evicted by the
//! dispatcher when a delivery reports the endpoint gone.

use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use moneta_core::types::{PushSubscription, SubscriptionKeys};
use moneta_scheduler::repo::SubscriptionDirectory;

use crate::error::Result;

pub struct SqliteSubscriptionDirectory {
    db: Mutex<Connection>,
}

impl SqliteSubscriptionDirectory {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Register (or refresh) a device endpoint. One row per (owner, endpoint):
    /// re-subscribing the same device replaces its key material in place.
    pub fn upsert(
        &self,
        owner: &str,
        endpoint: &str,
        keys: &SubscriptionKeys,
    ) -> Result<PushSubscription> {
        let db = self.db.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();

        db.execute(
            "INSERT INTO push_subscriptions (id, owner, endpoint, p256dh, auth, created_at)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(owner, endpoint)
             DO UPDATE SET p256dh = excluded.p256dh, auth = excluded.auth",
            rusqlite::params![id, owner, endpoint, keys.p256dh, keys.auth, now],
        )?;

        // Re-read so a refreshed row reports its original id and created_at.
        let sub = db.query_row(
            "SELECT id, owner, endpoint, p256dh, auth, created_at
             FROM push_subscriptions WHERE owner = ?1 AND endpoint = ?2",
            [owner, endpoint],
            row_to_subscription,
        )?;
        info!(subscription_id = %sub.id, %owner, "push subscription registered");
        Ok(sub)
    }

    pub fn count(&self) -> Result<u64> {
        let db = self.db.lock().unwrap();
        let n: u64 = db.query_row("SELECT COUNT(*) FROM push_subscriptions", [], |row| {
            row.get(0)
        })?;
        Ok(n)
    }

    fn list_for_user_inner(&self, owner: &str) -> Result<Vec<PushSubscription>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, owner, endpoint, p256dh, auth, created_at
             FROM push_subscriptions WHERE owner = ?1",
        )?;
        let subs = stmt
            .query_map([owner], row_to_subscription)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(subs)
    }

    fn remove_inner(&self, subscription_id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        // Zero rows affected is fine — removal is idempotent.
        let n = db.execute(
            "DELETE FROM push_subscriptions WHERE id = ?1",
            [subscription_id],
        )?;
        if n > 0 {
            info!(%subscription_id, "push subscription removed");
        }
        Ok(())
    }
}

fn row_to_subscription(row: &rusqlite::Row<'_>) -> rusqlite::Result<PushSubscription> {
    Ok(PushSubscription {
        id: row.get(0)?,
        owner: row.get(1)?,
        endpoint: row.get(2)?,
        keys: SubscriptionKeys {
            p256dh: row.get(3)?,
            auth: row.get(4)?,
        },
        created_at: row.get(5)?,
    })
}

impl SubscriptionDirectory for SqliteSubscriptionDirectory {
    fn list_for_user(&self, owner: &str) -> moneta_scheduler::Result<Vec<PushSubscription>> {
        Ok(self.list_for_user_inner(owner)?)
    }

    fn remove(&self, subscription_id: &str) -> moneta_scheduler::Result<()> {
        Ok(self.remove_inner(subscription_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> SqliteSubscriptionDirectory {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SqliteSubscriptionDirectory::new(conn)
    }

    fn keys(tag: &str) -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: format!("pk-{tag}"),
            auth: format!("auth-{tag}"),
        }
    }

    #[test]
    fn upsert_and_list_by_owner() {
        let dir = directory();
        dir.upsert("alice", "https://push/a", &keys("a")).unwrap();
        dir.upsert("alice", "https://push/b", &keys("b")).unwrap();
        dir.upsert("bob", "https://push/c", &keys("c")).unwrap();

        let alice = dir.list_for_user_inner("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|s| s.owner == "alice"));
    }

    #[test]
    fn resubscribe_same_device_replaces_keys_keeps_id() {
        let dir = directory();
        let first = dir.upsert("alice", "https://push/a", &keys("old")).unwrap();
        let second = dir.upsert("alice", "https://push/a", &keys("new")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.keys.p256dh, "pk-new");
        assert_eq!(dir.list_for_user_inner("alice").unwrap().len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = directory();
        let sub = dir.upsert("alice", "https://push/a", &keys("a")).unwrap();
        dir.remove_inner(&sub.id).unwrap();
        dir.remove_inner(&sub.id).unwrap(); // second removal: no error
        assert!(dir.list_for_user_inner("alice").unwrap().is_empty());
    }
}
