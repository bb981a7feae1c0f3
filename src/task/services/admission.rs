//! Concurrency admission for newly delegated tasks.

use super::{AdmissionRejected, TaskServiceError, TaskServiceResult};
use crate::task::{
    domain::{Task, TaskStats},
    ports::{TaskRegistry, TaskRegistryError},
};
use std::sync::{Mutex, MutexGuard};

/// Decides whether a new task may enter the registry.
///
/// Counting active tasks, inserting the new record, and launching its run
/// happen under one gate, so concurrent admissions cannot jointly exceed the
/// cap. Other writers only ever lower the active count, so they do not need
/// the gate. Closing takes the same gate: once [`AdmissionController::close`]
/// returns, every admitted task has been launched and no further task will be.
#[derive(Debug)]
pub struct AdmissionController {
    limit: usize,
    // `true` once closed.
    gate: Mutex<bool>,
}

impl AdmissionController {
    /// Creates a controller admitting at most `limit` active tasks.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            gate: Mutex::new(false),
        }
    }

    /// Returns the configured cap.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Applies the cap to the given counts.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionRejected`] when the number of pending and
    /// in-progress tasks has reached the cap.
    pub const fn can_admit(&self, stats: &TaskStats) -> Result<(), AdmissionRejected> {
        let current = stats.active();
        if current < self.limit {
            return Ok(());
        }
        Err(AdmissionRejected {
            limit: self.limit,
            current,
        })
    }

    /// Admits `task` into `registry` when capacity allows, then calls
    /// `launch` with the stored record before releasing the gate.
    ///
    /// On rejection nothing is inserted and `launch` is not called.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ShuttingDown`] once the controller is
    /// closed, [`TaskServiceError::AdmissionRejected`] when the cap is
    /// reached, and [`TaskServiceError::Registry`] when the registry fails,
    /// including a duplicate identifier.
    pub fn admit<R, F>(&self, registry: &R, task: Task, launch: F) -> TaskServiceResult<Task>
    where
        R: TaskRegistry,
        F: FnOnce(&Task),
    {
        let closed = self.lock_gate()?;
        if *closed {
            return Err(TaskServiceError::ShuttingDown);
        }

        let stats = registry.stats()?;
        if let Err(rejection) = self.can_admit(&stats) {
            tracing::warn!(
                limit = rejection.limit,
                current = rejection.current,
                "task admission rejected"
            );
            return Err(rejection.into());
        }

        registry.insert(task.clone())?;
        launch(&task);
        Ok(task)
    }

    /// Refuses all later admissions, waiting for any in-flight admission to
    /// finish launching.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Registry`] when the gate is poisoned.
    pub fn close(&self) -> TaskServiceResult<()> {
        *self.lock_gate()? = true;
        Ok(())
    }

    /// Returns `true` once [`AdmissionController::close`] has run.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Registry`] when the gate is poisoned.
    pub fn is_closed(&self) -> TaskServiceResult<bool> {
        Ok(*self.lock_gate()?)
    }

    fn lock_gate(&self) -> TaskServiceResult<MutexGuard<'_, bool>> {
        self.gate.lock().map_err(|err| {
            TaskRegistryError::persistence(std::io::Error::other(err.to_string())).into()
        })
    }
}
