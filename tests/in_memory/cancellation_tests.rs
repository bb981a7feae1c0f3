//! Cancellation semantics observed through the public manager API.

use std::time::Duration;

use foreman::task::{
    domain::{Progress, TaskState},
    services::{DelegateTaskRequest, TaskEvent, TaskServiceError},
};
use rstest::rstest;

use super::helpers::{TestManager, delegate_and_settle, quick_manager, slow_manager};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_task_stays_cancelled(slow_manager: TestManager) -> eyre::Result<()> {
    let receipt = slow_manager.delegate(DelegateTaskRequest::new("cancel me"))?;
    let task_id = receipt.task_id.to_string();

    let cancelled = slow_manager.cancel_task(&task_id)?;
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    eyre::ensure!(cancelled.state() == TaskState::Cancelled);
    let task = slow_manager.check_status(&task_id)?;
    eyre::ensure!(task.state() == TaskState::Cancelled);
    eyre::ensure!(task.progress() == cancelled.progress());
    eyre::ensure!(task.result().is_none());
    eyre::ensure!(task.completed_at().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancellation_preserves_progress_reached(slow_manager: TestManager) -> eyre::Result<()> {
    let mut events = slow_manager.subscribe();
    let receipt = slow_manager.delegate(DelegateTaskRequest::new("partial job"))?;
    loop {
        if let TaskEvent::Progressed { task_id, progress } = events.recv().await? {
            if task_id == receipt.task_id && progress == Progress::saturating(20) {
                break;
            }
        }
    }

    let cancelled = slow_manager.cancel_task(&receipt.task_id.to_string())?;
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    eyre::ensure!(cancelled.progress() == Progress::saturating(20));
    let task = slow_manager.check_status(&receipt.task_id.to_string())?;
    eyre::ensure!(task == cancelled, "engine overwrote the cancelled record");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_twice_reports_cancelled_state(slow_manager: TestManager) -> eyre::Result<()> {
    let receipt = slow_manager.delegate(DelegateTaskRequest::new("cancel twice"))?;
    let task_id = receipt.task_id.to_string();
    slow_manager.cancel_task(&task_id)?;

    let result = slow_manager.cancel_task(&task_id);

    eyre::ensure!(
        matches!(
            result,
            Err(TaskServiceError::InvalidState {
                current: TaskState::Cancelled,
                ..
            })
        ),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_cannot_be_cancelled(quick_manager: TestManager) -> eyre::Result<()> {
    let task = delegate_and_settle(&quick_manager, "already done").await?;

    let result = quick_manager.cancel_task(&task.id().to_string());

    eyre::ensure!(
        matches!(
            result,
            Err(TaskServiceError::InvalidState {
                current: TaskState::Completed,
                ..
            })
        ),
        "unexpected result {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelling_unknown_task_is_not_found(quick_manager: TestManager) -> eyre::Result<()> {
    let result = quick_manager.cancel_task("nonexistent");

    eyre::ensure!(
        matches!(result, Err(TaskServiceError::NotFound(_))),
        "unexpected result {result:?}"
    );
    Ok(())
}
