//! In-memory task registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Task, TaskDomainError, TaskId, TaskStats},
    ports::{TaskRegistry, TaskRegistryError, TaskRegistryResult},
};

/// Thread-safe in-memory task registry.
///
/// A single coarse-grained lock guards the whole map. Clones share the same
/// underlying records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRegistry {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRegistryResult<RwLockReadGuard<'_, HashMap<TaskId, Task>>> {
        self.state.read().map_err(|err| {
            TaskRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRegistryResult<RwLockWriteGuard<'_, HashMap<TaskId, Task>>> {
        self.state.write().map_err(|err| {
            TaskRegistryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl TaskRegistry for InMemoryTaskRegistry {
    fn insert(&self, task: Task) -> TaskRegistryResult<()> {
        let mut tasks = self.write()?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRegistryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task);
        Ok(())
    }

    fn get(&self, id: TaskId) -> TaskRegistryResult<Option<Task>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn mutate<T, F>(&self, id: TaskId, update: F) -> TaskRegistryResult<(T, Task)>
    where
        F: FnOnce(&mut Task) -> Result<T, TaskDomainError>,
    {
        let mut tasks = self.write()?;
        let stored = tasks.get_mut(&id).ok_or(TaskRegistryError::NotFound(id))?;

        // Work on a copy so a rejected update leaves the record untouched.
        let mut draft = stored.clone();
        let value = update(&mut draft).map_err(TaskRegistryError::Rejected)?;
        *stored = draft.clone();
        Ok((value, draft))
    }

    fn list(&self) -> TaskRegistryResult<Vec<Task>> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn stats(&self) -> TaskRegistryResult<TaskStats> {
        Ok(TaskStats::tally(self.read()?.values()))
    }

    fn remove(&self, id: TaskId) -> TaskRegistryResult<Option<Task>> {
        Ok(self.write()?.remove(&id))
    }

    fn clear(&self) -> TaskRegistryResult<()> {
        self.write()?.clear();
        Ok(())
    }
}
