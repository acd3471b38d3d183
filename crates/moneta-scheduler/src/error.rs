use thiserror::Error;

/// Errors surfaced by the reminder pipeline.
///
/// Store failures arrive as strings because the concrete store crates sit
/// behind the repository traits — the dispatcher neither knows nor cares
/// which storage technology produced them.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A plan / ledger / subscription store operation failed.
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
