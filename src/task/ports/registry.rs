//! Registry port: the single source of truth for task records.

use crate::task::domain::{Task, TaskDomainError, TaskId, TaskStats};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task registry operations.
pub type TaskRegistryResult<T> = Result<T, TaskRegistryError>;

/// Task record ownership contract.
///
/// Every method completes without suspending. [`TaskRegistry::mutate`] is the
/// single writer path: the update runs against the authoritative record while
/// no other mutation of that record can interleave, and it is committed only
/// when the update succeeds.
pub trait TaskRegistry: Send + Sync {
    /// Inserts a newly admitted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::DuplicateTask`] when the identifier is
    /// already present.
    fn insert(&self, task: Task) -> TaskRegistryResult<()>;

    /// Returns a copy of the task with the given identifier.
    ///
    /// Returns `None` when the task never existed or has been evicted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Persistence`] when the registry is
    /// unusable.
    fn get(&self, id: TaskId) -> TaskRegistryResult<Option<Task>>;

    /// Applies an atomic read-modify-write to a task and returns the
    /// update's value together with the committed record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::NotFound`] when the task is missing and
    /// [`TaskRegistryError::Rejected`] when the update refuses the change, in
    /// which case the stored record is untouched.
    fn mutate<T, F>(&self, id: TaskId, update: F) -> TaskRegistryResult<(T, Task)>
    where
        F: FnOnce(&mut Task) -> Result<T, TaskDomainError>;

    /// Returns a snapshot of every tracked record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Persistence`] when the registry is
    /// unusable.
    fn list(&self) -> TaskRegistryResult<Vec<Task>>;

    /// Returns total and per-state counts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Persistence`] when the registry is
    /// unusable.
    fn stats(&self) -> TaskRegistryResult<TaskStats> {
        let tasks = self.list()?;
        Ok(TaskStats::tally(&tasks))
    }

    /// Removes a task record, returning it when present.
    ///
    /// Only the retention policy removes records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Persistence`] when the registry is
    /// unusable.
    fn remove(&self, id: TaskId) -> TaskRegistryResult<Option<Task>>;

    /// Drops every record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Persistence`] when the registry is
    /// unusable.
    fn clear(&self) -> TaskRegistryResult<()>;
}

/// Errors returned by task registry implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRegistryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The update refused to change the record.
    #[error(transparent)]
    Rejected(TaskDomainError),

    /// Storage-layer failure.
    #[error("registry error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRegistryError {
    /// Wraps a storage-layer error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
