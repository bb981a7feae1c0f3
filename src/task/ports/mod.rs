//! Port contracts for delegated task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod executor;
pub mod registry;

pub use executor::{ExecutionJob, ExecutionStep, ExecutorError, ExecutorResult, TaskExecutor};
pub use registry::{TaskRegistry, TaskRegistryError, TaskRegistryResult};

#[cfg(test)]
pub use executor::MockTaskExecutor;
