//! Repository traits — the narrow seams between the dispatcher and storage.
//!
//! The production implementations live in `moneta-store` (SQLite); tests use
//! in-memory fakes. All operations are synchronous and idempotent, so callers
//! never need explicit locking beyond what the implementations do internally.

use moneta_core::types::{PushSubscription, RecurrencePlan};

use crate::error::Result;

/// Read access to planned transactions.
pub trait PlanStore: Send + Sync {
    /// All plans with `active = true`, across all users.
    fn list_active(&self) -> Result<Vec<RecurrencePlan>>;
}

/// Idempotency guard: has a (plan, occurrence) pair already been notified?
///
/// Append-only. Absence of a record always means "not yet notified", never
/// "unknown". Records are never updated or deleted by this subsystem.
pub trait NotificationLedger: Send + Sync {
    fn was_notified(&self, key: &str) -> Result<bool>;

    /// Record `key` as notified. Must tolerate duplicate marks without error —
    /// delivery may be retried by an overlapping cycle.
    fn mark_notified(&self, key: &str) -> Result<()>;
}

/// Lookup and eviction of registered push endpoints.
pub trait SubscriptionDirectory: Send + Sync {
    /// Active endpoints for one user; order is irrelevant.
    fn list_for_user(&self, owner: &str) -> Result<Vec<PushSubscription>>;

    /// Delete a registration. Removing an already-removed id is not an error.
    fn remove(&self, subscription_id: &str) -> Result<()>;
}
