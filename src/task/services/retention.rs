//! Bounded history for terminal task records.

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRegistry, TaskRegistryError, TaskRegistryResult},
};
use std::cmp::Ordering;
use std::sync::Mutex;

/// Evicts the oldest terminal records once more than `cap` are held.
///
/// Non-terminal records are never evicted. Enforcement runs are serialized so
/// that overlapping runs cannot evict more than necessary.
#[derive(Debug)]
pub struct RetentionPolicy {
    cap: usize,
    gate: Mutex<()>,
}

impl RetentionPolicy {
    /// Creates a policy keeping at most `cap` terminal records.
    #[must_use]
    pub const fn new(cap: usize) -> Self {
        Self {
            cap,
            gate: Mutex::new(()),
        }
    }

    /// Returns the configured cap.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Selects the terminal records to evict from a snapshot, oldest first.
    #[must_use]
    pub fn select_evictions(&self, tasks: &[Task]) -> Vec<TaskId> {
        let mut terminal: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.state().is_terminal())
            .collect();
        let excess = terminal.len().saturating_sub(self.cap);
        if excess == 0 {
            return Vec::new();
        }

        terminal.sort_by(|left, right| oldest_first(left, right));
        terminal
            .into_iter()
            .take(excess)
            .map(Task::id)
            .collect()
    }

    /// Evicts excess terminal records from `registry`, returning them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError`] when the registry cannot be read or
    /// updated.
    pub fn enforce<R>(&self, registry: &R) -> TaskRegistryResult<Vec<Task>>
    where
        R: TaskRegistry,
    {
        let _guard = self.gate.lock().map_err(|err| {
            TaskRegistryError::persistence(std::io::Error::other(err.to_string()))
        })?;

        let snapshot = registry.list()?;
        let mut evicted = Vec::new();
        for task_id in self.select_evictions(&snapshot) {
            if let Some(task) = registry.remove(task_id)? {
                tracing::debug!(task_id = %task_id, state = task.state().as_str(), "evicted terminal task");
                evicted.push(task);
            }
        }
        Ok(evicted)
    }
}

fn oldest_first(left: &Task, right: &Task) -> Ordering {
    left.updated_at()
        .cmp(&right.updated_at())
        .then_with(|| left.created_at().cmp(&right.created_at()))
        .then_with(|| left.id().cmp(&right.id()))
}
