//! Then steps for task delegation BDD scenarios.

use super::world::{TaskDelegationWorld, run_async};
use foreman::task::{
    domain::TaskState,
    services::{AdmissionRejected, TaskServiceError},
};
use rstest_bdd_macros::then;

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &TaskDelegationWorld, state: String) -> Result<(), eyre::Report> {
    let expected_state = TaskState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;

    let task = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task record"))?;

    if task.state() != expected_state {
        return Err(eyre::eyre!(
            "expected state {}, found {}",
            expected_state.as_str(),
            task.state().as_str()
        ));
    }

    Ok(())
}

#[then("the task progress is {progress:u8}")]
fn task_progress_is(world: &TaskDelegationWorld, progress: u8) -> Result<(), eyre::Report> {
    let task = world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task record"))?;

    eyre::ensure!(
        task.progress().value() == progress,
        "expected progress {progress}, found {}",
        task.progress()
    );
    Ok(())
}

#[then("delegation is rejected with limit {limit:usize} and current {current:usize}")]
fn delegation_rejected(
    world: &TaskDelegationWorld,
    limit: usize,
    current: usize,
) -> Result<(), eyre::Report> {
    let error = world
        .last_delegation_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected delegation to fail"))?;

    let expected = AdmissionRejected { limit, current };
    if !matches!(error, TaskServiceError::AdmissionRejected(rejection) if *rejection == expected) {
        return Err(eyre::eyre!("expected {expected:?}, got {error:?}"));
    }

    Ok(())
}

#[then("the registry holds {count:usize} tasks")]
fn registry_holds(world: &TaskDelegationWorld, count: usize) -> Result<(), eyre::Report> {
    let manager = world.manager()?;
    let stats = manager.get_stats()?;
    eyre::ensure!(stats.total == count, "expected {count} tasks, found {}", stats.total);
    run_async(manager.shutdown())?;
    Ok(())
}

#[then(r#"cancellation fails because the task is "{state}""#)]
fn cancellation_fails(world: &TaskDelegationWorld, state: String) -> Result<(), eyre::Report> {
    let expected_state = TaskState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let result = world
        .last_cancel_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing cancellation result"))?;

    if !matches!(result, Err(TaskServiceError::InvalidState { current, .. }) if *current == expected_state)
    {
        return Err(eyre::eyre!(
            "expected InvalidState({}) error, got {result:?}",
            expected_state.as_str()
        ));
    }

    Ok(())
}

#[then("the lookup fails with not found")]
fn lookup_fails_with_not_found(world: &TaskDelegationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_lookup_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing lookup result"))?;

    if !matches!(result, Err(TaskServiceError::NotFound(_))) {
        return Err(eyre::eyre!("expected NotFound error, got {result:?}"));
    }

    Ok(())
}
