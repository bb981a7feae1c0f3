//! Domain model for delegated task lifecycle management.
//!
//! The task domain models admission-time validation, the lifecycle state
//! machine, and derived statistics while keeping all scheduling and storage
//! concerns outside of the domain boundary.

mod error;
mod ids;
mod stats;
mod task;

pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::{ListLimit, Progress, TaskContext, TaskDescription, TaskId};
pub use stats::TaskStats;
pub use task::{Task, TaskOutput, TaskState};
