//! Service-level errors returned at the task manager boundary.

use super::ConfigError;
use crate::task::{
    domain::{TaskDomainError, TaskId, TaskState},
    ports::TaskRegistryError,
};
use thiserror::Error;

/// Structured rejection returned when the concurrency cap is reached.
///
/// Carries enough detail for callers to implement backoff.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("concurrency limit reached: {current} of {limit} tasks active")]
pub struct AdmissionRejected {
    /// Configured maximum number of active tasks.
    pub limit: usize,
    /// Number of active tasks at the time of the decision.
    pub current: usize,
}

/// Service-level errors for delegation, query, and cancellation operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input validation failed; no record was created.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The concurrency cap was reached; no record was created.
    #[error(transparent)]
    AdmissionRejected(#[from] AdmissionRejected),

    /// No record exists for the identifier, either because it never existed
    /// or because it was evicted.
    #[error("task {0} not found")]
    NotFound(String),

    /// Cancellation was requested for a task that is already terminal.
    #[error("task {task_id} is already {}", current.as_str())]
    InvalidState {
        /// Task identifier.
        task_id: TaskId,
        /// State the task was found in.
        current: TaskState,
    },

    /// The manager no longer accepts work.
    #[error("task manager is shutting down")]
    ShuttingDown,

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Registry operation failed or an internal invariant was violated.
    #[error(transparent)]
    Registry(#[from] TaskRegistryError),
}

impl TaskServiceError {
    /// Returns `true` for rejections the caller can resolve by retrying or
    /// correcting its request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::AdmissionRejected(_) | Self::InvalidState { .. }
        )
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
