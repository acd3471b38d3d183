//! Cron trigger endpoint — POST /cron/reminders.
//!
//! An external scheduler (hosting platform cron, systemd timer) invokes this
//! on a fixed cadence. The shared secret may arrive as a `?secret=` query
//! parameter or as `{"secret": ".."}` in the body. A bad or missing secret
//! rejects the invocation before any processing; otherwise one reminder
//! cycle runs and the aggregate delivery count is returned.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;

#[derive(Deserialize)]
pub struct CronQuery {
    pub secret: Option<String>,
}

#[derive(Deserialize)]
pub struct CronBody {
    pub secret: Option<String>,
}

/// POST /cron/reminders — run one reminder cycle.
///
/// Returns `{"notified": <count>}` on success and 401 when the secret is
/// absent or wrong. Cycle-internal failures never surface as an HTTP error —
/// the cycle always yields a count (zero on total failure).
pub async fn cron_reminders_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CronQuery>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Body is optional and best-effort: a non-JSON or empty body simply
    // contributes no secret.
    let body_secret = serde_json::from_slice::<CronBody>(&body)
        .ok()
        .and_then(|b| b.secret);
    let presented = query.secret.or(body_secret);

    if !secret_matches(
        state.config.gateway.cron_secret.as_deref(),
        presented.as_deref(),
    ) {
        warn!("cron trigger rejected: bad or missing secret");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "unauthorized"})),
        ));
    }

    let report = state.dispatcher.run_cycle(Utc::now()).await;
    Ok(Json(json!({"notified": report.notified})))
}

/// A request is authorized only when a secret is configured and the
/// presented value matches it exactly. No configured secret means every
/// trigger is rejected — there is no open mode.
fn secret_matches(expected: Option<&str>, presented: Option<&str>) -> bool {
    match expected {
        Some(want) => presented == Some(want),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use moneta_core::config::MonetaConfig;
    use moneta_core::types::{Frequency, Recurrence};
    use moneta_scheduler::{Dispatcher, NotificationLedger, Occurrence};
    use moneta_store::{SqliteLedger, SqlitePlanStore, SqliteSubscriptionDirectory};
    use rusqlite::Connection;

    fn mem<T>(build: impl Fn(Connection) -> T) -> T {
        let conn = Connection::open_in_memory().unwrap();
        moneta_store::db::init_db(&conn).unwrap();
        build(conn)
    }

    /// In-memory AppState with one due plan and no subscriptions. Returns the
    /// ledger handle and the occurrence key so tests can observe whether a
    /// cycle actually ran: an authorized trigger marks the key, an
    /// unauthorized one must not.
    fn fixture() -> (Arc<AppState>, Arc<SqliteLedger>, String) {
        let plans = Arc::new(mem(SqlitePlanStore::new));
        let ledger = Arc::new(mem(SqliteLedger::new));
        let subscriptions = Arc::new(mem(SqliteSubscriptionDirectory::new));

        let start = Utc::now() + chrono::Duration::minutes(5);
        let rule = Recurrence {
            frequency: Frequency::Daily,
            interval: 1,
            by_day: vec![],
            by_month_day: vec![],
            start_date: start,
            end_date: None,
        };
        let plan = plans
            .insert("alice", "Rent", None, -120_000, "EUR", Some(&rule))
            .unwrap();
        let key = Occurrence::new(plan.id, start).key();

        let dispatcher = Dispatcher::new(
            plans.clone(),
            ledger.clone(),
            subscriptions.clone(),
            Arc::new(moneta_push::WebPushClient::new(60)),
            chrono::Duration::hours(1),
            std::time::Duration::from_secs(5),
        );

        let mut config = MonetaConfig::default();
        config.gateway.cron_secret = Some("s3cret".to_string());
        let state = Arc::new(AppState::new(config, dispatcher, plans, subscriptions));
        (state, ledger, key)
    }

    #[tokio::test]
    async fn wrong_or_missing_secret_is_401_with_no_side_effects() {
        let (state, ledger, key) = fixture();

        for secret in [Some("nope".to_string()), None] {
            let (status, _) =
                cron_reminders_handler(State(state.clone()), Query(CronQuery { secret }), Bytes::new())
                    .await
                    .unwrap_err();
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        // No cycle ran: the due occurrence was never marked.
        assert!(!ledger.was_notified(&key).unwrap());
    }

    #[tokio::test]
    async fn query_secret_runs_a_cycle_and_returns_count() {
        let (state, ledger, key) = fixture();

        let Json(body) = cron_reminders_handler(
            State(state),
            Query(CronQuery {
                secret: Some("s3cret".to_string()),
            }),
            Bytes::new(),
        )
        .await
        .unwrap();

        // Zero subscriptions registered, so nothing was delivered…
        assert_eq!(body["notified"], 0);
        // …but the cycle ran and marked the occurrence.
        assert!(ledger.was_notified(&key).unwrap());
    }

    #[tokio::test]
    async fn body_secret_is_accepted_too() {
        let (state, ledger, key) = fixture();

        let Json(body) = cron_reminders_handler(
            State(state),
            Query(CronQuery { secret: None }),
            Bytes::from(r#"{"secret":"s3cret"}"#),
        )
        .await
        .unwrap();

        assert_eq!(body["notified"], 0);
        assert!(ledger.was_notified(&key).unwrap());
    }

    #[test]
    fn matching_secret_is_authorized() {
        assert!(secret_matches(Some("s3cret"), Some("s3cret")));
    }

    #[test]
    fn wrong_or_missing_secret_is_rejected() {
        assert!(!secret_matches(Some("s3cret"), Some("nope")));
        assert!(!secret_matches(Some("s3cret"), None));
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        assert!(!secret_matches(None, Some("anything")));
        assert!(!secret_matches(None, None));
    }
}
