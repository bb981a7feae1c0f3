//! Application services for delegated task admission, execution, and
//! queries.

mod admission;
mod config;
mod error;
mod events;
mod lifecycle;
mod manager;
mod query;
mod retention;

pub use admission::AdmissionController;
pub use config::{
    ConfigError, ENV_MAX_CONCURRENT_TASKS, ENV_MAX_CONTEXT_LENGTH, ENV_MAX_DESCRIPTION_LENGTH,
    ENV_RETENTION_CAP, ENV_TASK_TIMEOUT_MS, TaskManagerConfig,
};
pub use error::{AdmissionRejected, TaskServiceError, TaskServiceResult};
pub use events::{EVENT_CHANNEL_CAPACITY, TaskEvent, TaskEventPublisher};
pub use lifecycle::{ENGINE_PANIC_ERROR, LifecycleEngine, RunOutcome, SHUTDOWN_ERROR};
pub use manager::{DelegateTaskRequest, DelegationReceipt, TaskManager};
pub use query::{ListTasksRequest, TaskListing};
pub use retention::RetentionPolicy;
