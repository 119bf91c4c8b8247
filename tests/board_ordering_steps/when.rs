//! When steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use laneboard::placement::services::MoveTaskRequest;
use rstest_bdd_macros::when;

#[when(r#""{title}" is moved to "{lane}" position {position:usize}"#)]
fn task_is_moved(
    world: &mut BoardWorld,
    title: String,
    lane: String,
    position: usize,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let result = run_async(
        world
            .service
            .move_task(MoveTaskRequest::new(task_id, lane, position)),
    );
    world.last_move_result = Some(result);
    Ok(())
}

#[when(r#""{title}" is removed"#)]
fn task_is_removed(world: &mut BoardWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(world.service.remove(task_id)).wrap_err_with(|| format!("remove {title:?}"))?;
    world.tasks.remove(&title);
    Ok(())
}
