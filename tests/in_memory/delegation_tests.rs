//! Delegation, admission, and completion through the public manager API.

use std::time::Duration;

use foreman::task::{
    domain::{Progress, TaskDomainError, TaskState},
    services::{
        AdmissionRejected, DelegateTaskRequest, TaskManagerConfig, TaskServiceError,
    },
};
use rstest::rstest;

use super::helpers::{
    TestManager, build_manager, delegate_and_settle, quick_executor, quick_manager,
    slow_executor, slow_manager,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delegated_task_runs_to_completion(quick_manager: TestManager) -> eyre::Result<()> {
    let receipt = quick_manager.delegate(
        DelegateTaskRequest::new("Summarise the release notes").with_context("v1.2.0"),
    )?;
    eyre::ensure!(receipt.state == TaskState::Pending);

    let task = quick_manager
        .await_terminal(&receipt.task_id.to_string())
        .await?;

    eyre::ensure!(task.state() == TaskState::Completed);
    eyre::ensure!(task.progress() == Progress::COMPLETE);
    let result = task
        .result()
        .ok_or_else(|| eyre::eyre!("completed task should carry a result"))?;
    eyre::ensure!(result.value()["summary"] == "Task completed: Summarise the release notes");
    eyre::ensure!(result.value()["hasContext"] == true);
    eyre::ensure!(task.error().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_timestamps_are_ordered(quick_manager: TestManager) -> eyre::Result<()> {
    let task = delegate_and_settle(&quick_manager, "ordered timestamps").await?;

    let started_at = task
        .started_at()
        .ok_or_else(|| eyre::eyre!("started_at should be set"))?;
    let completed_at = task
        .completed_at()
        .ok_or_else(|| eyre::eyre!("completed_at should be set"))?;
    eyre::ensure!(task.created_at() <= started_at);
    eyre::ensure!(started_at <= completed_at);
    eyre::ensure!(completed_at <= task.updated_at());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlong_description_is_rejected(quick_manager: TestManager) -> eyre::Result<()> {
    let result = quick_manager.delegate(DelegateTaskRequest::new("d".repeat(5_001)));

    eyre::ensure!(
        matches!(
            result,
            Err(TaskServiceError::Validation(TaskDomainError::DescriptionTooLong {
                length: 5_001,
                max: 5_000,
            }))
        ),
        "unexpected result {result:?}"
    );
    eyre::ensure!(quick_manager.get_stats()?.total == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admission_cap_rejects_without_creating_records(
    slow_manager: TestManager,
) -> eyre::Result<()> {
    for index in 0..10 {
        slow_manager.delegate(DelegateTaskRequest::new(format!("long job {index}")))?;
    }

    let result = slow_manager.delegate(DelegateTaskRequest::new("rejected"));

    let Err(TaskServiceError::AdmissionRejected(rejection)) = result else {
        eyre::bail!("expected an admission rejection, got {result:?}");
    };
    eyre::ensure!(
        rejection
            == AdmissionRejected {
                limit: 10,
                current: 10,
            }
    );
    eyre::ensure!(slow_manager.get_stats()?.total == 10);
    slow_manager.shutdown().await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_delegations_respect_the_cap() -> eyre::Result<()> {
    let manager = build_manager(
        TaskManagerConfig::default().with_max_concurrent_tasks(3),
        slow_executor(),
    )?;

    let attempts: Vec<_> = (0..16)
        .map(|index| {
            let spawned = manager.clone();
            tokio::spawn(async move {
                spawned
                    .delegate(DelegateTaskRequest::new(format!("racing job {index}")))
                    .is_ok()
            })
        })
        .collect();
    let mut admitted = 0;
    for attempt in attempts {
        if attempt.await? {
            admitted += 1;
        }
    }

    eyre::ensure!(admitted == 3, "admitted {admitted} tasks");
    eyre::ensure!(manager.get_stats()?.active() == 3);
    manager.shutdown().await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn timed_out_task_is_failed() -> eyre::Result<()> {
    let manager = build_manager(
        TaskManagerConfig::default().with_task_timeout(Duration::from_millis(50)),
        slow_executor(),
    )?;

    let task = delegate_and_settle(&manager, "too slow").await?;

    eyre::ensure!(task.state() == TaskState::Failed);
    eyre::ensure!(task.error() == Some("task timed out after 50 ms"));
    eyre::ensure!(task.completed_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn settled_tasks_free_capacity() -> eyre::Result<()> {
    let manager = build_manager(
        TaskManagerConfig::default().with_max_concurrent_tasks(1),
        quick_executor(),
    )?;

    for index in 0..3 {
        let task = delegate_and_settle(&manager, &format!("sequential {index}")).await?;
        eyre::ensure!(task.state() == TaskState::Completed);
    }
    Ok(())
}
