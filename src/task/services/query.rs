//! Read-side request and response types for task listings.

use crate::task::domain::{ListLimit, Task, TaskDomainError, TaskState};
use serde::Serialize;
use std::cmp::Ordering;

/// Request payload for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksRequest {
    status: Option<TaskState>,
    limit: Option<usize>,
}

impl ListTasksRequest {
    /// Creates an unfiltered request using the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to one state.
    #[must_use]
    pub const fn with_status(mut self, status: TaskState) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the maximum number of records returned.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the state filter, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskState> {
        self.status
    }

    /// Returns the validated limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidListLimit`] when the requested limit
    /// is outside `1..=100`.
    pub fn limit(&self) -> Result<ListLimit, TaskDomainError> {
        self.limit.map_or(Ok(ListLimit::DEFAULT), ListLimit::new)
    }
}

/// Filtered, newest-first page of task records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListing {
    /// Number of records in the registry.
    pub total: usize,
    /// Number of records matching the filter, before truncation.
    pub filtered: usize,
    /// Matching records, most recently updated first.
    pub tasks: Vec<Task>,
}

impl TaskListing {
    /// Builds a listing from a registry snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Vec<Task>, status: Option<TaskState>, limit: ListLimit) -> Self {
        let total = snapshot.len();
        let mut tasks: Vec<Task> = snapshot
            .into_iter()
            .filter(|task| status.is_none_or(|wanted| task.state() == wanted))
            .collect();
        let filtered = tasks.len();

        tasks.sort_by(newest_first);
        tasks.truncate(limit.value());

        Self {
            total,
            filtered,
            tasks,
        }
    }
}

fn newest_first(left: &Task, right: &Task) -> Ordering {
    right
        .updated_at()
        .cmp(&left.updated_at())
        .then_with(|| right.created_at().cmp(&left.created_at()))
        .then_with(|| left.id().cmp(&right.id()))
}
