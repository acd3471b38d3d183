//! `moneta-store` — SQLite persistence for plans, the notification ledger,
//! and push subscriptions.
//!
//! Each store wraps its own `Connection` in a `Mutex` and implements the
//! corresponding repository trait from `moneta-scheduler`, so the dispatcher
//! never sees rusqlite. Schema migrations are idempotent (`IF NOT EXISTS`)
//! and run on every startup via [`db::init_db`].

pub mod db;
pub mod error;
pub mod ledger;
pub mod plans;
pub mod subscriptions;

pub use error::StoreError;
pub use ledger::SqliteLedger;
pub use plans::SqlitePlanStore;
pub use subscriptions::SqliteSubscriptionDirectory;
