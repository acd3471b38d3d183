//! Push transport seam — delivery of one payload to one device endpoint.

use async_trait::async_trait;
use thiserror::Error;

use moneta_core::reminder::ReminderPayload;
use moneta_core::types::PushSubscription;

/// Delivery failure kinds the dispatcher reacts to.
#[derive(Debug, Error)]
pub enum PushError {
    /// Terminal: the endpoint no longer exists (HTTP 404/410, unsubscribed).
    /// The dispatcher evicts the subscription on seeing this.
    #[error("endpoint gone (status {status})")]
    Gone { status: u16 },

    /// Transient: anything else. The subscription is kept; no in-cycle retry.
    #[error("push transport error: {0}")]
    Transport(String),
}

/// Sends a reminder payload to a single registered device.
///
/// The production implementation is `moneta-push::WebPushClient`.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &ReminderPayload,
    ) -> std::result::Result<(), PushError>;
}
