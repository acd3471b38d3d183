use chrono::{DateTime, Utc};

/// One concrete calendar instant at which a recurring plan is due.
///
/// Occurrences are derived on demand by [`crate::expand`], never stored as
/// entities. The [`key`](Occurrence::key) is the idempotency handle recorded
/// in the notification ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub plan_id: String,
    pub at: DateTime<Utc>,
}

impl Occurrence {
    pub fn new(plan_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            plan_id: plan_id.into(),
            at,
        }
    }

    /// Deterministic ledger key: plan id + instant truncated to the minute.
    ///
    /// Minute granularity bounds ledger growth to actual occurrences while
    /// keeping the key stable across cycles that recompute the same window.
    pub fn key(&self) -> String {
        format!("{}:{}", self.plan_id, self.at.format("%Y-%m-%dT%H:%M"))
    }
}
