//! `moneta-core` — shared config, errors, and domain types for the Moneta
//! personal-finance tracker.
//!
//! The CRUD surface of the application (accounts, transactions, categories)
//! lives in the web frontend; what this workspace implements is the
//! planned-transaction reminder pipeline. The types here are the contract
//! between the stores, the scheduler, and the push transport.

pub mod config;
pub mod error;
pub mod reminder;
pub mod types;

pub use config::MonetaConfig;
pub use error::{CoreError, Result};
pub use reminder::ReminderPayload;
pub use types::{
    Frequency, PushSubscription, Recurrence, RecurrencePlan, SubscriptionKeys, WeekdayCode,
};
