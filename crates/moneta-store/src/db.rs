use rusqlite::Connection;

use crate::error::Result;

/// Initialise all Moneta tables and indexes.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS plans (
            id           TEXT PRIMARY KEY,
            owner        TEXT NOT NULL,
            active       INTEGER NOT NULL DEFAULT 1,
            description  TEXT NOT NULL,
            category     TEXT,
            amount_minor INTEGER NOT NULL,
            currency     TEXT NOT NULL,
            recurrence   TEXT,               -- JSON-encoded Recurrence, NULL for one-offs
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_plans_active
            ON plans(active);
        CREATE INDEX IF NOT EXISTS idx_plans_owner
            ON plans(owner);

        -- Append-only idempotency ledger: presence of a key = already notified.
        CREATE TABLE IF NOT EXISTS notification_log (
            key        TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS push_subscriptions (
            id         TEXT PRIMARY KEY,
            owner      TEXT NOT NULL,
            endpoint   TEXT NOT NULL,
            p256dh     TEXT NOT NULL,
            auth       TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(owner, endpoint)
        );
        CREATE INDEX IF NOT EXISTS idx_push_subscriptions_owner
            ON push_subscriptions(owner);",
    )?;
    Ok(())
}
