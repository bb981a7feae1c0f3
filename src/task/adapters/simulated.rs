//! Simulated executor that stands in for a real sub-agent call.

use crate::task::{
    domain::{Progress, TaskOutput},
    ports::{ExecutionJob, ExecutionStep, ExecutorResult, TaskExecutor},
};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Executor that performs a fixed number of delay-then-progress steps.
///
/// The final step produces a summary payload echoing the description. It is
/// suitable for local runs and tests; no external process is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedExecutor {
    steps: u32,
    step_delay: Duration,
}

impl SimulatedExecutor {
    /// Number of steps used by [`SimulatedExecutor::default`].
    pub const DEFAULT_STEPS: u32 = 5;

    /// Per-step delay used by [`SimulatedExecutor::default`].
    pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

    /// Creates an executor with `steps` units of work, each taking
    /// `step_delay`.
    ///
    /// A zero step count is raised to one.
    #[must_use]
    pub fn new(steps: u32, step_delay: Duration) -> Self {
        Self {
            steps: steps.max(1),
            step_delay,
        }
    }

    /// Returns the number of steps per run.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Returns the delay before each step reports.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        self.step_delay
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEPS, Self::DEFAULT_STEP_DELAY)
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn step(&self, job: &ExecutionJob, step: u32) -> ExecutorResult<ExecutionStep> {
        tokio::time::sleep(self.step_delay).await;

        let done = step.saturating_add(1);
        if done < self.steps {
            return Ok(ExecutionStep::Progressed(Progress::of_steps(done, self.steps)));
        }

        Ok(ExecutionStep::Finished(TaskOutput::new(json!({
            "summary": format!("Task completed: {}", job.description),
            "steps": self.steps,
            "hasContext": job.context.is_some(),
        }))))
    }
}
