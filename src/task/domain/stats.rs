//! Per-state task counts derived from registry snapshots.

use super::{Task, TaskState};
use serde::{Deserialize, Serialize};

/// Total and per-state task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Number of tracked records.
    pub total: usize,
    /// Records awaiting the engine.
    pub pending: usize,
    /// Records being driven by the engine.
    pub in_progress: usize,
    /// Records that completed successfully.
    pub completed: usize,
    /// Records that failed or timed out.
    pub failed: usize,
    /// Records stopped by cancellation.
    pub cancelled: usize,
}

impl TaskStats {
    /// Tallies the given records.
    #[must_use]
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks
            .into_iter()
            .fold(Self::default(), |stats, task| stats.with(task.state()))
    }

    /// Returns the count for a single state.
    #[must_use]
    pub const fn count(&self, state: TaskState) -> usize {
        match state {
            TaskState::Pending => self.pending,
            TaskState::InProgress => self.in_progress,
            TaskState::Completed => self.completed,
            TaskState::Failed => self.failed,
            TaskState::Cancelled => self.cancelled,
        }
    }

    /// Returns the number of records counting against the concurrency cap.
    #[must_use]
    pub const fn active(&self) -> usize {
        self.pending.saturating_add(self.in_progress)
    }

    /// Returns the number of records in a terminal state.
    #[must_use]
    pub const fn terminal(&self) -> usize {
        self.completed
            .saturating_add(self.failed)
            .saturating_add(self.cancelled)
    }

    const fn with(mut self, state: TaskState) -> Self {
        self.total = self.total.saturating_add(1);
        match state {
            TaskState::Pending => self.pending = self.pending.saturating_add(1),
            TaskState::InProgress => self.in_progress = self.in_progress.saturating_add(1),
            TaskState::Completed => self.completed = self.completed.saturating_add(1),
            TaskState::Failed => self.failed = self.failed.saturating_add(1),
            TaskState::Cancelled => self.cancelled = self.cancelled.saturating_add(1),
        }
        self
    }
}
