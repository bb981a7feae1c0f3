//! When steps for task delegation BDD scenarios.

use super::world::{TaskDelegationWorld, run_async};
use eyre::WrapErr;
use foreman::task::services::DelegateTaskRequest;
use rstest_bdd_macros::when;

#[when(r#"a task "{description}" is delegated"#)]
fn delegate_task(world: &mut TaskDelegationWorld, description: String) -> Result<(), eyre::Report> {
    match world.manager()?.delegate(DelegateTaskRequest::new(description)) {
        Ok(receipt) => world.last_receipt = Some(receipt),
        Err(err) => world.last_delegation_error = Some(err),
    }
    Ok(())
}

#[when("{count:usize} background tasks are delegated")]
fn delegate_background_tasks(
    world: &mut TaskDelegationWorld,
    count: usize,
) -> Result<(), eyre::Report> {
    for index in 0..count {
        let receipt = world
            .manager()?
            .delegate(DelegateTaskRequest::new(format!("background task {index}")))
            .wrap_err("delegate background task")?;
        world.last_receipt = Some(receipt);
    }
    Ok(())
}

#[when("the task is awaited until it settles")]
fn await_task(world: &mut TaskDelegationWorld) -> Result<(), eyre::Report> {
    let task_id = world.last_task_id()?;
    let task = run_async(world.manager()?.await_terminal(&task_id))
        .wrap_err("await delegated task")?;
    world.last_task = Some(task);
    Ok(())
}

#[when("the task is cancelled")]
fn cancel_task(world: &mut TaskDelegationWorld) -> Result<(), eyre::Report> {
    let task_id = world.last_task_id()?;
    let task = world
        .manager()?
        .cancel_task(&task_id)
        .wrap_err("cancel delegated task")?;
    world.last_task = Some(task);
    Ok(())
}

#[when("cancellation is requested for the task")]
fn request_cancellation(world: &mut TaskDelegationWorld) -> Result<(), eyre::Report> {
    let task_id = world.last_task_id()?;
    let result = world.manager()?.cancel_task(&task_id);
    world.last_cancel_result = Some(result);
    Ok(())
}

#[when(r#"the status of "{task_id}" is checked"#)]
fn check_status(world: &mut TaskDelegationWorld, task_id: String) -> Result<(), eyre::Report> {
    let result = world.manager()?.check_status(&task_id);
    world.last_lookup_result = Some(result);
    Ok(())
}
