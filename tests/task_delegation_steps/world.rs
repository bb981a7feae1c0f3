//! Shared world state for task delegation BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use foreman::task::{
    adapters::{SimulatedExecutor, memory::InMemoryTaskRegistry},
    domain::Task,
    services::{
        DelegationReceipt, TaskManager, TaskManagerConfig, TaskServiceError,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Manager type used by the BDD world.
pub type TestTaskManager = TaskManager<InMemoryTaskRegistry, SimulatedExecutor, DefaultClock>;

/// Scenario world for task delegation behaviour tests.
#[derive(Default)]
pub struct TaskDelegationWorld {
    pub config: TaskManagerConfig,
    pub manager: Option<TestTaskManager>,
    pub last_receipt: Option<DelegationReceipt>,
    pub last_task: Option<Task>,
    pub last_delegation_error: Option<TaskServiceError>,
    pub last_cancel_result: Option<Result<Task, TaskServiceError>>,
    pub last_lookup_result: Option<Result<Task, TaskServiceError>>,
}

impl TaskDelegationWorld {
    /// Builds the manager from the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    pub fn start_manager(&mut self, step_delay: Duration) -> Result<(), eyre::Report> {
        let manager = TaskManager::new(
            Arc::new(InMemoryTaskRegistry::new()),
            Arc::new(SimulatedExecutor::new(3, step_delay)),
            Arc::new(DefaultClock),
            self.config.clone(),
        )?;
        self.manager = Some(manager);
        Ok(())
    }

    /// Returns the manager started by a `Given` step.
    ///
    /// # Errors
    ///
    /// Returns an error if no manager has been started.
    pub fn manager(&self) -> Result<&TestTaskManager, eyre::Report> {
        self.manager
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task manager in scenario world"))
    }

    /// Returns the identifier of the most recently delegated task.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has been delegated.
    pub fn last_task_id(&self) -> Result<String, eyre::Report> {
        self.last_receipt
            .as_ref()
            .map(|receipt| receipt.task_id.to_string())
            .ok_or_else(|| eyre::eyre!("missing delegation receipt in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskDelegationWorld {
    TaskDelegationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
