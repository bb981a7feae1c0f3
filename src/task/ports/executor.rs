//! Executor port for performing delegated work.

use crate::task::domain::{Progress, Task, TaskContext, TaskDescription, TaskId, TaskOutput};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Immutable inputs handed to the executor for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionJob {
    /// Task being executed.
    pub task_id: TaskId,
    /// Caller-supplied description.
    pub description: TaskDescription,
    /// Caller-supplied context, if any.
    pub context: Option<TaskContext>,
}

impl ExecutionJob {
    /// Builds the job for a task record.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            description: task.description().clone(),
            context: task.context().cloned(),
        }
    }
}

/// Outcome of one unit of executor work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStep {
    /// More work remains; the task has reached the given progress.
    Progressed(Progress),
    /// The work is finished.
    Finished(TaskOutput),
}

/// Stepwise executor contract.
///
/// The lifecycle engine calls [`TaskExecutor::step`] with increasing step
/// numbers, starting at zero, until a step returns
/// [`ExecutionStep::Finished`]. Before each call the engine re-reads the task
/// status, so cancellation is observed at step granularity without the
/// executor needing to know about it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Performs one unit of work for the job.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the work cannot be completed; the engine
    /// records the task as failed.
    async fn step(&self, job: &ExecutionJob, step: u32) -> ExecutorResult<ExecutionStep>;
}

/// Errors returned by executor adapters.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The delegated work failed with a reportable reason.
    #[error("{0}")]
    Failed(String),

    /// Generic runtime failure inside the executor.
    #[error("executor runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutorError {
    /// Creates a failure with a human-readable reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Wraps a runtime error from the executor adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
