//! Push notifications for task lifecycle changes.
//!
//! Status stays pull-based: events are advisory and may be dropped for slow
//! subscribers, who should re-read the registry when they lag.

use crate::task::domain::{Progress, TaskId};
use serde::Serialize;
use tokio::sync::broadcast;

/// Number of events buffered per subscriber before it lags.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A committed change to a task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    /// The task was admitted in the pending state.
    Admitted {
        /// Task identifier.
        task_id: TaskId,
    },
    /// The engine moved the task into progress.
    Started {
        /// Task identifier.
        task_id: TaskId,
    },
    /// The engine recorded executor progress.
    Progressed {
        /// Task identifier.
        task_id: TaskId,
        /// Progress after the step.
        progress: Progress,
    },
    /// The executor finished within the deadline.
    Completed {
        /// Task identifier.
        task_id: TaskId,
    },
    /// The executor failed or the deadline elapsed.
    Failed {
        /// Task identifier.
        task_id: TaskId,
        /// Failure description recorded on the task.
        error: String,
    },
    /// A cancellation request stopped the task.
    Cancelled {
        /// Task identifier.
        task_id: TaskId,
    },
    /// The retention policy dropped the terminal record.
    Evicted {
        /// Task identifier.
        task_id: TaskId,
    },
}

impl TaskEvent {
    /// Returns the task the event refers to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Admitted { task_id }
            | Self::Started { task_id }
            | Self::Progressed { task_id, .. }
            | Self::Completed { task_id }
            | Self::Failed { task_id, .. }
            | Self::Cancelled { task_id }
            | Self::Evicted { task_id } => *task_id,
        }
    }

    /// Returns `true` when the event reports a terminal transition or an
    /// eviction.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. }
                | Self::Failed { .. }
                | Self::Cancelled { .. }
                | Self::Evicted { .. }
        )
    }
}

/// Broadcast handle shared by the services that commit task changes.
#[derive(Debug, Clone)]
pub struct TaskEventPublisher {
    sender: broadcast::Sender<TaskEvent>,
}

impl TaskEventPublisher {
    /// Creates a publisher with [`EVENT_CHANNEL_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes an event to current subscribers.
    pub fn publish(&self, event: TaskEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("no task event subscribers");
        }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }
}

impl Default for TaskEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
