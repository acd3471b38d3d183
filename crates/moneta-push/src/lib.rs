//! `moneta-push` — reqwest-backed push delivery.
//!
//! Implements the [`moneta_scheduler::PushTransport`] seam: POST the reminder
//! payload to a device's push endpoint and classify the outcome as success,
//! terminal (endpoint gone → evict), or transient (keep, no in-cycle retry).

pub mod client;

pub use client::WebPushClient;
