//! Task manager: the boundary operations exposed to the protocol layer.

use super::{
    AdmissionController, ConfigError, LifecycleEngine, ListTasksRequest, RetentionPolicy,
    RunOutcome, TaskEvent, TaskEventPublisher, TaskListing, TaskManagerConfig, TaskServiceError,
    TaskServiceResult,
};
use crate::task::{
    domain::{
        Task, TaskContext, TaskDescription, TaskDomainError, TaskId, TaskState, TaskStats,
    },
    ports::{TaskExecutor, TaskRegistry, TaskRegistryError},
};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use mockable::Clock;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Request payload for delegating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateTaskRequest {
    description: String,
    context: Option<String>,
}

impl DelegateTaskRequest {
    /// Creates a request with the task description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            context: None,
        }
    }

    /// Sets supplementary context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Acknowledgement returned for an admitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelegationReceipt {
    /// Identifier of the new task.
    pub task_id: TaskId,
    /// State at admission, always [`TaskState::Pending`].
    pub state: TaskState,
    /// Admission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Admits, drives, and answers queries about delegated tasks.
///
/// Each admitted task gets its own engine run, spawned onto a tracker so
/// that [`TaskManager::shutdown`] can stop and await all of them. The manager
/// is cheap to clone; clones share the registry and engines.
pub struct TaskManager<R, E, C>
where
    R: TaskRegistry + 'static,
    E: TaskExecutor + 'static,
    C: Clock + Send + Sync + 'static,
{
    config: TaskManagerConfig,
    registry: Arc<R>,
    clock: Arc<C>,
    engine: Arc<LifecycleEngine<R, E, C>>,
    admission: Arc<AdmissionController>,
    retention: Arc<RetentionPolicy>,
    events: TaskEventPublisher,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl<R, E, C> Clone for TaskManager<R, E, C>
where
    R: TaskRegistry + 'static,
    E: TaskExecutor + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
            engine: Arc::clone(&self.engine),
            admission: Arc::clone(&self.admission),
            retention: Arc::clone(&self.retention),
            events: self.events.clone(),
            tracker: self.tracker.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<R, E, C> TaskManager<R, E, C>
where
    R: TaskRegistry + 'static,
    E: TaskExecutor + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a manager over an owned registry instance.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is unusable.
    pub fn new(
        registry: Arc<R>,
        executor: Arc<E>,
        clock: Arc<C>,
        config: TaskManagerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let events = TaskEventPublisher::new();
        let engine = LifecycleEngine::new(
            Arc::clone(&registry),
            executor,
            Arc::clone(&clock),
            config.task_timeout,
            events.clone(),
        );

        Ok(Self {
            admission: Arc::new(AdmissionController::new(config.max_concurrent_tasks)),
            retention: Arc::new(RetentionPolicy::new(config.retention_cap)),
            config,
            registry,
            clock,
            engine: Arc::new(engine),
            events,
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Returns the configuration the manager was built with.
    #[must_use]
    pub const fn config(&self) -> &TaskManagerConfig {
        &self.config
    }

    /// Validates and admits a task, then starts driving it in the background.
    ///
    /// Must be called from within a Tokio runtime; the engine run is spawned
    /// onto it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for malformed input,
    /// [`TaskServiceError::AdmissionRejected`] when the concurrency cap is
    /// reached, [`TaskServiceError::ShuttingDown`] after shutdown began, and
    /// [`TaskServiceError::Registry`] when the registry fails.
    pub fn delegate(&self, request: DelegateTaskRequest) -> TaskServiceResult<DelegationReceipt> {
        let description =
            TaskDescription::new(request.description, self.config.max_description_length)?;
        let context = TaskContext::optional(request.context, self.config.max_context_length)?;
        let task = Task::new(description, context, &*self.clock);

        let launched = self.admission.admit(&*self.registry, task, |admitted| {
            let task_id = admitted.id();
            tracing::info!(task_id = %task_id, "task admitted");
            self.events.publish(TaskEvent::Admitted { task_id });
            self.spawn_engine(task_id);
        });
        let admitted = match launched {
            Ok(admitted) => admitted,
            Err(TaskServiceError::Registry(TaskRegistryError::DuplicateTask(task_id))) => {
                tracing::error!(task_id = %task_id, "generated task identifier collided with an existing record");
                return Err(TaskRegistryError::DuplicateTask(task_id).into());
            }
            Err(err) => return Err(err),
        };
        self.enforce_retention();

        Ok(DelegationReceipt {
            task_id: admitted.id(),
            state: admitted.state(),
            created_at: admitted.created_at(),
        })
    }

    /// Returns the current record for a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no record exists,
    /// [`TaskServiceError::Validation`] for a blank identifier, and
    /// [`TaskServiceError::Registry`] when the registry fails.
    pub fn check_status(&self, task_id: &str) -> TaskServiceResult<Task> {
        let id = resolve_task_id(task_id)?;
        self.registry
            .get(id)?
            .ok_or_else(|| TaskServiceError::NotFound(task_id.to_owned()))
    }

    /// Lists tasks, newest first, optionally filtered by state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an out-of-range limit and
    /// [`TaskServiceError::Registry`] when the registry fails.
    pub fn list_tasks(&self, request: &ListTasksRequest) -> TaskServiceResult<TaskListing> {
        let limit = request.limit()?;
        let snapshot = self.registry.list()?;
        Ok(TaskListing::from_snapshot(snapshot, request.status(), limit))
    }

    /// Cancels a pending or in-progress task.
    ///
    /// The engine observes the cancellation at its next check point and
    /// stops without committing further changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no record exists,
    /// [`TaskServiceError::InvalidState`] when the task is already terminal,
    /// and [`TaskServiceError::Registry`] when the registry fails.
    pub fn cancel_task(&self, task_id: &str) -> TaskServiceResult<Task> {
        let id = resolve_task_id(task_id)?;
        let (_, cancelled) = self
            .registry
            .mutate(id, |task| task.cancel(&*self.clock))
            .map_err(|err| match err {
                TaskRegistryError::NotFound(_) => TaskServiceError::NotFound(task_id.to_owned()),
                TaskRegistryError::Rejected(TaskDomainError::InvalidStateTransition {
                    task_id: rejected_id,
                    from,
                    ..
                }) => TaskServiceError::InvalidState {
                    task_id: rejected_id,
                    current: from,
                },
                other => TaskServiceError::Registry(other),
            })?;

        tracing::info!(task_id = %id, progress = cancelled.progress().value(), "task cancelled");
        self.events.publish(TaskEvent::Cancelled { task_id: id });
        self.enforce_retention();
        Ok(cancelled)
    }

    /// Returns total and per-state counts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Registry`] when the registry fails.
    pub fn get_stats(&self) -> TaskServiceResult<TaskStats> {
        Ok(self.registry.stats()?)
    }

    /// Subscribes to task lifecycle events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    /// Waits until the task reaches a terminal state and returns its record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the record does not exist
    /// or is evicted before it could be read, along with the errors of
    /// [`TaskManager::check_status`].
    pub async fn await_terminal(&self, task_id: &str) -> TaskServiceResult<Task> {
        let id = resolve_task_id(task_id)?;
        let mut events = self.subscribe();
        loop {
            let task = self
                .registry
                .get(id)?
                .ok_or_else(|| TaskServiceError::NotFound(task_id.to_owned()))?;
            if task.state().is_terminal() {
                return Ok(task);
            }

            loop {
                match events.recv().await {
                    Ok(event) if event.task_id() == id && event.is_settled() => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => break,
                    Err(RecvError::Closed) => {
                        return Err(TaskServiceError::NotFound(task_id.to_owned()));
                    }
                }
            }
        }
    }

    /// Stops admitting work, interrupts running engines, waits for them to
    /// exit, and clears the registry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Registry`] when the admission gate or the
    /// registry is unusable.
    pub async fn shutdown(&self) -> TaskServiceResult<()> {
        tracing::info!(active = self.tracker.len(), "task manager shutting down");
        // Every admission either launched before this returns or is refused.
        self.admission.close()?;
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        self.registry.clear()?;
        Ok(())
    }

    fn spawn_engine(&self, task_id: TaskId) {
        let manager = self.clone();
        let shutdown = self.shutdown.child_token();
        self.tracker.spawn(async move {
            let run = AssertUnwindSafe(manager.engine.run(task_id, shutdown)).catch_unwind();
            match run.await {
                Ok(RunOutcome::Abandoned) => {
                    tracing::warn!(task_id = %task_id, "engine run abandoned");
                }
                Ok(_) => {}
                Err(_) => manager.engine.record_crash(task_id),
            }
            manager.enforce_retention();
        });
    }

    fn enforce_retention(&self) {
        match self.retention.enforce(&*self.registry) {
            Ok(evicted) => {
                for task in evicted {
                    self.events.publish(TaskEvent::Evicted { task_id: task.id() });
                }
            }
            Err(err) => tracing::warn!(error = %err, "retention enforcement failed"),
        }
    }
}

/// Parses a boundary identifier.
///
/// Text that is not a well-formed identifier cannot name any record, so it is
/// reported as not found; only a blank identifier is a validation error.
fn resolve_task_id(raw: &str) -> TaskServiceResult<TaskId> {
    match raw.parse::<TaskId>() {
        Ok(task_id) => Ok(task_id),
        Err(TaskDomainError::MalformedTaskId(_)) => Err(TaskServiceError::NotFound(raw.to_owned())),
        Err(err) => Err(err.into()),
    }
}
