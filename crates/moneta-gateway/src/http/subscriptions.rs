//! Push subscription registration — POST /subscriptions, DELETE /subscriptions/{id}.
//!
//! The web frontend posts the browser's PushSubscription here after the user
//! grants notification permission. Unsubscribing by id is idempotent; most
//! stale registrations are evicted automatically by the reminder cycle when
//! the push service reports them gone.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use moneta_core::types::SubscriptionKeys;

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub owner: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// POST /subscriptions — register or refresh a device endpoint.
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if req.owner.is_empty() || req.endpoint.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "owner and endpoint are required"})),
        ));
    }

    let sub = state
        .subscriptions
        .upsert(&req.owner, &req.endpoint, &req.keys)
        .map_err(|e| {
            warn!(owner = %req.owner, error = %e, "subscription upsert failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal error"})),
            )
        })?;

    Ok(Json(json!({"ok": true, "subscription": sub})))
}

/// DELETE /subscriptions/{id} — remove a registration (idempotent).
pub async fn unsubscribe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    use moneta_scheduler::SubscriptionDirectory;

    state.subscriptions.remove(&id).map_err(|e| {
        warn!(subscription_id = %id, error = %e, "subscription removal failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "internal error"})),
        )
    })?;

    Ok(Json(json!({"ok": true})))
}
