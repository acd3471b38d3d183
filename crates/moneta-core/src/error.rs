use thiserror::Error;

/// Errors shared across the Moneta workspace.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration file / env extraction failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A recurrence rule violates its invariants (interval, date ordering).
    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
