use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A plan was submitted with a rule that violates the recurrence
    /// invariants (interval ≥ 1, end_date ≥ start_date).
    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for moneta_scheduler::SchedulerError {
    fn from(e: StoreError) -> Self {
        moneta_scheduler::SchedulerError::Store(e.to_string())
    }
}
