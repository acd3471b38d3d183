//! `moneta-scheduler` — the planned-transaction reminder pipeline.
//!
//! # Overview
//!
//! An external cron trigger hits the gateway once per cadence; the gateway
//! calls [`Dispatcher::run_cycle`]. One cycle:
//!
//! ```text
//! run_cycle(now)
//!   ├── PlanStore::list_active()
//!   ├── expand(rule, [now, now + lookahead])      — pure date walk
//!   ├── NotificationLedger::was_notified(key)?    — skip duplicates
//!   ├── SubscriptionDirectory::list_for_user()
//!   ├── PushTransport::send()  × N devices        — fan-out, collect-all
//!   │     ├── Ok            → counted
//!   │     ├── Err(Gone)     → SubscriptionDirectory::remove()
//!   │     └── Err(Transport)→ logged, subscription kept
//!   └── NotificationLedger::mark_notified(key)    — exactly once
//! ```
//!
//! The ledger's idempotent check/mark pair is the only concurrency guard:
//! overlapping cycles may rarely double-send (at-least-once), but a marked
//! occurrence is never reprocessed.
//!
//! Storage and transport are injected as trait objects ([`PlanStore`],
//! [`NotificationLedger`], [`SubscriptionDirectory`], [`PushTransport`]) so
//! the dispatcher is testable without SQLite or a network.

pub mod dispatcher;
pub mod error;
pub mod expand;
pub mod occurrence;
pub mod repo;
pub mod transport;

pub use dispatcher::{CycleReport, Dispatcher};
pub use error::{Result, SchedulerError};
pub use expand::expand;
pub use occurrence::Occurrence;
pub use repo::{NotificationLedger, PlanStore, SubscriptionDirectory};
pub use transport::{PushError, PushTransport};
