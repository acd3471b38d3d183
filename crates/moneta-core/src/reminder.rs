//! Reminder payload — the fixed message shape delivered for each occurrence.
//!
//! Built by the dispatcher when an occurrence comes due; serialized as JSON
//! by the push transport. Shared here so the gateway and tests can assert on
//! the exact wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecurrencePlan;

/// Deep link opened when the user taps the notification.
const PLANNED_TRANSACTIONS_URL: &str = "/planned-transactions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl ReminderPayload {
    /// Build the payload for one due occurrence of `plan`.
    pub fn for_plan(plan: &RecurrencePlan, due: DateTime<Utc>) -> Self {
        Self {
            title: "Planned transaction due".to_string(),
            body: format!(
                "{} is due at {}",
                plan.description,
                due.format("%H:%M UTC on %b %-d")
            ),
            url: PLANNED_TRANSACTIONS_URL.to_string(),
        }
    }
}
