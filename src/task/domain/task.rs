//! Task aggregate root and related task lifecycle types.

use super::{ParseTaskStateError, Progress, TaskContext, TaskDescription, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been admitted but the engine has not started it.
    Pending,
    /// The engine is driving the executor.
    InProgress,
    /// The executor finished within the deadline.
    Completed,
    /// The executor failed or the deadline elapsed.
    Failed,
    /// An explicit cancellation request stopped the task.
    Cancelled,
}

impl TaskState {
    /// Every state, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    /// Returns the canonical text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns `true` when the task counts against the concurrency cap.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Returns `true` when the lifecycle permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress | Self::Cancelled)
                | (
                    Self::InProgress,
                    Self::Completed | Self::Failed | Self::Cancelled
                )
        )
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Opaque payload produced by a successful executor run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskOutput(serde_json::Value);

impl TaskOutput {
    /// Wraps an executor payload.
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Creates a plain-text payload.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self(serde_json::Value::String(value.into()))
    }

    /// Returns the wrapped payload.
    #[must_use]
    pub const fn value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Consumes the output and returns the wrapped payload.
    #[must_use]
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Task aggregate root.
///
/// All mutations are guarded by [`TaskState::can_transition_to`]; a rejected
/// mutation leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    description: TaskDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<TaskContext>,
    state: TaskState,
    progress: Progress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<TaskOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Task {
    /// Creates a new pending task with a freshly generated identifier.
    #[must_use]
    pub fn new(
        description: TaskDescription,
        context: Option<TaskContext>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            description,
            context,
            state: TaskState::Pending,
            progress: Progress::ZERO,
            created_at: timestamp,
            updated_at: timestamp,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the caller-supplied description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the supplementary context, if any.
    #[must_use]
    pub const fn context(&self) -> Option<&TaskContext> {
        self.context.as_ref()
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the last recorded progress.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when the engine started the task, if it has.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the task completed or failed, if it has.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the executor output of a completed task.
    #[must_use]
    pub const fn result(&self) -> Option<&TaskOutput> {
        self.result.as_ref()
    }

    /// Returns the failure description of a failed task.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Moves a pending task into progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// pending.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.guard_transition(TaskState::InProgress)?;
        let timestamp = self.touch(clock);
        self.state = TaskState::InProgress;
        self.progress = Progress::ZERO;
        self.started_at = Some(timestamp);
        Ok(())
    }

    /// Records executor progress.
    ///
    /// Progress never decreases; a lower value keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ProgressRequiresInProgress`] unless the task
    /// is in progress.
    pub fn record_progress(
        &mut self,
        progress: Progress,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.state != TaskState::InProgress {
            return Err(TaskDomainError::ProgressRequiresInProgress {
                task_id: self.id,
                state: self.state,
            });
        }
        self.progress = self.progress.max(progress);
        self.touch(clock);
        Ok(())
    }

    /// Records a successful executor run.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// in progress.
    pub fn complete(&mut self, output: TaskOutput, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.guard_transition(TaskState::Completed)?;
        let timestamp = self.touch(clock);
        self.state = TaskState::Completed;
        self.progress = Progress::COMPLETE;
        self.completed_at = Some(timestamp);
        self.result = Some(output);
        Ok(())
    }

    /// Records a failed executor run or an elapsed deadline.
    ///
    /// Progress keeps the last recorded value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// in progress.
    pub fn fail(&mut self, reason: impl Into<String>, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.guard_transition(TaskState::Failed)?;
        let timestamp = self.touch(clock);
        self.state = TaskState::Failed;
        self.completed_at = Some(timestamp);
        self.error = Some(reason.into());
        Ok(())
    }

    /// Cancels a pending or in-progress task.
    ///
    /// Cancellation does not set `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the task is
    /// already terminal.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.guard_transition(TaskState::Cancelled)?;
        self.touch(clock);
        self.state = TaskState::Cancelled;
        Ok(())
    }

    fn guard_transition(&self, target: TaskState) -> Result<(), TaskDomainError> {
        if self.state.can_transition_to(target) {
            return Ok(());
        }
        Err(TaskDomainError::InvalidStateTransition {
            task_id: self.id,
            from: self.state,
            to: target,
        })
    }

    /// Refreshes `updated_at`, never moving it backwards, and returns it.
    fn touch(&mut self, clock: &impl Clock) -> DateTime<Utc> {
        self.updated_at = clock.utc().max(self.updated_at);
        self.updated_at
    }
}
