//! Error types for task domain validation and parsing.

use super::{TaskId, TaskState};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The task description exceeds the configured length.
    #[error("task description has {length} characters, exceeds limit of {max}")]
    DescriptionTooLong {
        /// Actual length in characters.
        length: usize,
        /// Configured maximum length.
        max: usize,
    },

    /// The task context exceeds the configured length.
    #[error("task context has {length} characters, exceeds limit of {max}")]
    ContextTooLong {
        /// Actual length in characters.
        length: usize,
        /// Configured maximum length.
        max: usize,
    },

    /// The task identifier is empty after trimming.
    #[error("task identifier must not be empty")]
    EmptyTaskId,

    /// The task identifier is not a valid UUID.
    #[error("malformed task identifier '{0}'")]
    MalformedTaskId(String),

    /// The requested listing size is outside the permitted range.
    #[error("list limit {requested} is invalid, expected 1..={max}")]
    InvalidListLimit {
        /// Requested listing size.
        requested: usize,
        /// Largest permitted listing size.
        max: usize,
    },

    /// The requested state transition is not permitted.
    #[error("task {task_id} cannot transition from {} to {}", from.as_str(), to.as_str())]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
    },

    /// Progress was reported for a task that is not in progress.
    #[error("task {task_id} is {}, progress can only be recorded while in progress", state.as_str())]
    ProgressRequiresInProgress {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        state: TaskState,
    },
}

/// Error returned while parsing task states from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
