//! HTTP push client.
//!
//! The payload is posted as JSON to the subscription's endpoint with the
//! subscriber's key material forwarded in headers. Payload encryption and
//! VAPID signing are handled by the push relay fronting the endpoints — this
//! client's job is the delivery attempt and the outcome classification the
//! dispatcher's eviction logic depends on.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use moneta_core::reminder::ReminderPayload;
use moneta_core::types::PushSubscription;
use moneta_scheduler::transport::{PushError, PushTransport};

pub struct WebPushClient {
    http: reqwest::Client,
    ttl_secs: u64,
}

impl WebPushClient {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            ttl_secs,
        }
    }
}

/// Map a push-service HTTP status to a delivery outcome.
///
/// 404 and 410 both mean the registration is dead: push services return 410
/// Gone for expired subscriptions and 404 for endpoints they never knew.
fn classify_status(status: StatusCode) -> Result<(), PushError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(PushError::Gone {
            status: status.as_u16(),
        }),
        other => Err(PushError::Transport(format!(
            "push service returned {other}"
        ))),
    }
}

#[async_trait]
impl PushTransport for WebPushClient {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &ReminderPayload,
    ) -> Result<(), PushError> {
        let resp = self
            .http
            .post(&subscription.endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .header("Urgency", "normal")
            .header("Crypto-Key", format!("p256dh={}", subscription.keys.p256dh))
            .header("Encryption", format!("auth={}", subscription.keys.auth))
            .json(payload)
            .send()
            .await
            .map_err(|e| PushError::Transport(format!("request failed: {e}")))?;

        let status = resp.status();
        debug!(subscription_id = %subscription.id, %status, "push delivery attempted");
        classify_status(status)
    }
}
