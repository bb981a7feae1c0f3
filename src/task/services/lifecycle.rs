//! Lifecycle engine driving a single task from pending to a terminal state.

use super::{TaskEvent, TaskEventPublisher};
use crate::task::{
    domain::{TaskDomainError, TaskId, TaskOutput, TaskState},
    ports::{ExecutionJob, ExecutionStep, TaskExecutor, TaskRegistry, TaskRegistryError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Error recorded on tasks interrupted by manager shutdown.
pub const SHUTDOWN_ERROR: &str = "task manager shut down before the task finished";

/// Error recorded on tasks whose engine panicked.
pub const ENGINE_PANIC_ERROR: &str = "internal error: task engine panicked";

/// How an engine run ended, from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The engine committed a completed result.
    Completed,
    /// The engine committed a failure (executor error, timeout, or shutdown).
    Failed,
    /// A cancellation reached the registry before the engine's terminal
    /// write; the record stays cancelled.
    Cancelled,
    /// The record vanished or the registry failed; nothing was committed.
    Abandoned,
}

/// Terminal decision reached while driving the executor.
enum Verdict {
    Complete(TaskOutput),
    Fail(String),
    Stopped,
}

/// Drives tasks through their state machine.
///
/// Every write goes through [`TaskRegistry::mutate`], and the authoritative
/// status is re-read before each executor step. A cancellation written by
/// another caller is therefore never overwritten: the engine's next progress
/// or terminal write is refused by the domain guard and the run ends as
/// [`RunOutcome::Cancelled`].
pub struct LifecycleEngine<R, E, C>
where
    R: TaskRegistry,
    E: TaskExecutor,
    C: Clock + Send + Sync,
{
    registry: Arc<R>,
    executor: Arc<E>,
    clock: Arc<C>,
    timeout: Duration,
    events: TaskEventPublisher,
}

impl<R, E, C> LifecycleEngine<R, E, C>
where
    R: TaskRegistry,
    E: TaskExecutor,
    C: Clock + Send + Sync,
{
    /// Creates an engine enforcing `timeout` on each run.
    #[must_use]
    pub const fn new(
        registry: Arc<R>,
        executor: Arc<E>,
        clock: Arc<C>,
        timeout: Duration,
        events: TaskEventPublisher,
    ) -> Self {
        Self {
            registry,
            executor,
            clock,
            timeout,
            events,
        }
    }

    /// Returns the per-run deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drives the task to a terminal state.
    ///
    /// The run stops early when `shutdown` fires, recording the task as
    /// failed with [`SHUTDOWN_ERROR`].
    pub async fn run(&self, task_id: TaskId, shutdown: CancellationToken) -> RunOutcome {
        let job = match self.registry.mutate(task_id, |task| {
            task.start(&*self.clock)?;
            Ok(ExecutionJob::for_task(task))
        }) {
            Ok((job, _)) => job,
            Err(TaskRegistryError::Rejected(TaskDomainError::InvalidStateTransition {
                from: TaskState::Cancelled,
                ..
            })) => {
                tracing::debug!(task_id = %task_id, "task cancelled before the engine started it");
                return RunOutcome::Cancelled;
            }
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to start task");
                return RunOutcome::Abandoned;
            }
        };
        self.events.publish(TaskEvent::Started { task_id });
        tracing::debug!(task_id = %task_id, "task started");

        let verdict = tokio::select! {
            biased;
            () = shutdown.cancelled() => Verdict::Fail(SHUTDOWN_ERROR.to_owned()),
            driven = tokio::time::timeout(self.timeout, self.drive(&job)) => {
                driven.unwrap_or_else(|_| Verdict::Fail(self.timeout_message()))
            }
        };

        self.settle(task_id, verdict)
    }

    /// Records a panicked run as failed, if the task is still in progress.
    pub fn record_crash(&self, task_id: TaskId) {
        tracing::error!(task_id = %task_id, "task engine panicked");
        // A cancelled or already-settled record keeps its state.
        if self.settle(task_id, Verdict::Fail(ENGINE_PANIC_ERROR.to_owned())) == RunOutcome::Abandoned {
            tracing::error!(task_id = %task_id, "could not record engine panic on task");
        }
    }

    /// Runs executor steps until one finishes, fails, or the task leaves the
    /// in-progress state.
    async fn drive(&self, job: &ExecutionJob) -> Verdict {
        let task_id = job.task_id;
        let mut step: u32 = 0;
        loop {
            match self.registry.get(task_id) {
                Ok(Some(task)) if task.state() == TaskState::InProgress => {}
                Ok(_) => return Verdict::Stopped,
                Err(err) => return Verdict::Fail(err.to_string()),
            }

            let progress = match self.executor.step(job, step).await {
                Ok(ExecutionStep::Progressed(progress)) => progress,
                Ok(ExecutionStep::Finished(output)) => return Verdict::Complete(output),
                Err(err) => return Verdict::Fail(err.to_string()),
            };

            match self
                .registry
                .mutate(task_id, |task| task.record_progress(progress, &*self.clock))
            {
                Ok(_) => {
                    tracing::debug!(task_id = %task_id, step, progress = progress.value(), "task progressed");
                    self.events
                        .publish(TaskEvent::Progressed { task_id, progress });
                }
                Err(TaskRegistryError::Rejected(_)) => return Verdict::Stopped,
                Err(err) => return Verdict::Fail(err.to_string()),
            }
            step = step.saturating_add(1);
        }
    }

    /// Commits the verdict unless a cancellation got there first.
    fn settle(&self, task_id: TaskId, verdict: Verdict) -> RunOutcome {
        let committed = match verdict {
            Verdict::Stopped => return self.observe_stop(task_id),
            Verdict::Complete(output) => self
                .registry
                .mutate(task_id, |task| task.complete(output, &*self.clock)),
            Verdict::Fail(reason) => self
                .registry
                .mutate(task_id, |task| task.fail(reason, &*self.clock)),
        };

        match committed {
            Ok(((), task)) if task.state() == TaskState::Completed => {
                self.events.publish(TaskEvent::Completed { task_id });
                tracing::info!(task_id = %task_id, "task completed");
                RunOutcome::Completed
            }
            Ok(((), task)) => {
                let error = task.error().unwrap_or_default().to_owned();
                tracing::info!(task_id = %task_id, error = %error, "task failed");
                self.events.publish(TaskEvent::Failed { task_id, error });
                RunOutcome::Failed
            }
            // A cancellation committed first; the domain guard refused the write.
            Err(TaskRegistryError::Rejected(_)) => self.observe_stop(task_id),
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to settle task");
                RunOutcome::Abandoned
            }
        }
    }

    /// Reports why the engine could not commit further changes.
    fn observe_stop(&self, task_id: TaskId) -> RunOutcome {
        match self.registry.get(task_id) {
            Ok(Some(task)) if task.state() == TaskState::Cancelled => {
                tracing::info!(
                    task_id = %task_id,
                    progress = task.progress().value(),
                    "task cancelled, engine stopped"
                );
                RunOutcome::Cancelled
            }
            Ok(Some(task)) => {
                tracing::warn!(task_id = %task_id, state = task.state().as_str(), "engine stopped on unexpected state");
                RunOutcome::Abandoned
            }
            Ok(None) => RunOutcome::Abandoned,
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to read task after stop");
                RunOutcome::Abandoned
            }
        }
    }

    fn timeout_message(&self) -> String {
        format!("task timed out after {} ms", self.timeout.as_millis())
    }
}
