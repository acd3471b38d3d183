//! Reminder dispatcher — orchestrates one cycle: load due plans, expand,
//! filter already-notified, fan out deliveries, record outcomes.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use moneta_core::reminder::ReminderPayload;
use moneta_core::types::{PushSubscription, RecurrencePlan};

use crate::error::Result;
use crate::expand::expand;
use crate::occurrence::Occurrence;
use crate::repo::{NotificationLedger, PlanStore, SubscriptionDirectory};
use crate::transport::{PushError, PushTransport};

/// Aggregate result of one reminder cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Successful deliveries across all plans and occurrences.
    pub notified: u32,
}

/// Orchestrates reminder cycles over injected stores and transport.
///
/// All collaborators are trait objects so the dispatcher can run against
/// SQLite in production and in-memory fakes in tests. The dispatcher holds no
/// mutable state of its own — every cycle re-reads the stores.
pub struct Dispatcher {
    plans: Arc<dyn PlanStore>,
    ledger: Arc<dyn NotificationLedger>,
    subscriptions: Arc<dyn SubscriptionDirectory>,
    transport: Arc<dyn PushTransport>,
    lookahead: Duration,
    delivery_timeout: StdDuration,
}

impl Dispatcher {
    pub fn new(
        plans: Arc<dyn PlanStore>,
        ledger: Arc<dyn NotificationLedger>,
        subscriptions: Arc<dyn SubscriptionDirectory>,
        transport: Arc<dyn PushTransport>,
        lookahead: Duration,
        delivery_timeout: StdDuration,
    ) -> Self {
        Self {
            plans,
            ledger,
            subscriptions,
            transport,
            lookahead,
            delivery_timeout,
        }
    }

    /// Run one reminder cycle for the window `[now, now + lookahead]`.
    ///
    /// Never fails: a total failure loading plans yields `notified: 0`, and a
    /// store failure while processing one plan isolates that plan only. The
    /// external trigger re-invokes on the next cadence regardless.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let plans = match self.plans.list_active() {
            Ok(plans) => plans,
            Err(e) => {
                error!(error = %e, "failed to load active plans; cycle aborted");
                return CycleReport { notified: 0 };
            }
        };

        let window_end = now + self.lookahead;
        let mut notified = 0u32;

        for plan in &plans {
            match self.process_plan(plan, now, window_end).await {
                Ok(n) => notified += n,
                Err(e) => {
                    warn!(plan_id = %plan.id, error = %e, "plan processing failed; continuing with remaining plans");
                }
            }
        }

        info!(notified, plans = plans.len(), "reminder cycle complete");
        CycleReport { notified }
    }

    /// Process every due occurrence of one plan. Returns the number of
    /// successful deliveries for this plan.
    async fn process_plan(
        &self,
        plan: &RecurrencePlan,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<u32> {
        let Some(rule) = &plan.recurrence else {
            return Ok(0); // one-off entry, nothing to expand
        };

        let mut notified = 0u32;

        for at in expand(rule, window_start, window_end) {
            let key = Occurrence::new(plan.id.clone(), at).key();

            if self.ledger.was_notified(&key)? {
                debug!(%key, "occurrence already notified; skipping");
                continue;
            }

            let subs = self.subscriptions.list_for_user(&plan.owner)?;
            if subs.is_empty() {
                // Nothing to deliver, but mark anyway so the occurrence is
                // not re-evaluated every cycle.
                debug!(%key, owner = %plan.owner, "no subscriptions; marking occurrence processed");
                self.ledger.mark_notified(&key)?;
                continue;
            }

            let payload = ReminderPayload::for_plan(plan, at);
            let outcomes = join_all(subs.iter().map(|sub| self.deliver(sub, &payload))).await;

            for (sub, outcome) in subs.iter().zip(outcomes) {
                match outcome {
                    Ok(()) => notified += 1,
                    Err(PushError::Gone { status }) => {
                        info!(subscription_id = %sub.id, status, "evicting stale push subscription");
                        if let Err(e) = self.subscriptions.remove(&sub.id) {
                            warn!(subscription_id = %sub.id, error = %e, "eviction failed");
                        }
                    }
                    Err(PushError::Transport(reason)) => {
                        warn!(subscription_id = %sub.id, %reason, "push delivery failed; subscription kept");
                    }
                }
            }

            // One mark per occurrence, after the whole batch. Devices that
            // failed transiently get no second attempt for this occurrence.
            self.ledger.mark_notified(&key)?;
        }

        Ok(notified)
    }

    /// Single delivery wrapped in the per-delivery timeout. A timeout is a
    /// transient failure like any other transport error.
    async fn deliver(
        &self,
        sub: &PushSubscription,
        payload: &ReminderPayload,
    ) -> std::result::Result<(), PushError> {
        match tokio::time::timeout(self.delivery_timeout, self.transport.send(sub, payload)).await {
            Ok(result) => result,
            Err(_) => Err(PushError::Transport(format!(
                "delivery timed out after {:?}",
                self.delivery_timeout
            ))),
        }
    }
}
