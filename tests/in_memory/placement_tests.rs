//! Lane ordering through the public placement API.

use super::helpers::{TestService, ids, lane_titles, project_id, seed_lane, service};
use laneboard::placement::{
    domain::{Lane, Position, ProjectId, Task, is_dense},
    services::{InsertTaskRequest, MoveTaskRequest, PlacementError, UpdateTaskRequest},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_example_reorders_lanes(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let seeded = seed_lane(&service, project_id, "todo", &["A", "B", "C"]).await?;
    seed_lane(&service, project_id, "done", &["D"]).await?;
    let [_, b, c] =
        <[Task; 3]>::try_from(seeded).map_err(|_| eyre::eyre!("expected three seeded tasks"))?;

    service
        .move_task(MoveTaskRequest::new(c.id(), "todo", 0))
        .await?;
    let reordered = lane_titles(&service, project_id, "todo").await?;
    eyre::ensure!(reordered == ["C", "A", "B"], "unexpected todo order {reordered:?}");

    service
        .move_task(MoveTaskRequest::new(b.id(), "done", 0))
        .await?;
    let todo_left = lane_titles(&service, project_id, "todo").await?;
    let done = lane_titles(&service, project_id, "done").await?;
    eyre::ensure!(todo_left == ["C", "A"], "unexpected todo order {todo_left:?}");
    eyre::ensure!(done == ["B", "D"], "unexpected done order {done:?}");

    service.remove(c.id()).await?;
    let remaining = lane_titles(&service, project_id, "todo").await?;
    eyre::ensure!(remaining == ["A"], "unexpected todo order {remaining:?}");

    let (lane, position) = service.position_of(b.id()).await?;
    eyre::ensure!(
        lane == Lane::Done && position == Position::FIRST,
        "B should head the done lane, found {lane} at {position}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inserting_in_the_middle_shifts_the_tail(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    seed_lane(&service, project_id, "review", &["first", "last"]).await?;

    let middle = service
        .insert(
            InsertTaskRequest::new(project_id, "middle")
                .in_lane("review")
                .at_position(1),
        )
        .await?;

    eyre::ensure!(
        middle.position() == Position::new(1),
        "inserted at {}",
        middle.position()
    );
    let review = lane_titles(&service, project_id, "review").await?;
    eyre::ensure!(
        review == ["first", "middle", "last"],
        "unexpected review order {review:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_position_is_clamped_to_the_tail(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let seeded = seed_lane(&service, project_id, "todo", &["A", "B"]).await?;
    let head = ids(&seeded)
        .first()
        .copied()
        .ok_or_else(|| eyre::eyre!("expected a seeded task"))?;

    let moved = service
        .move_task(MoveTaskRequest::new(head, "todo", 99))
        .await?;

    eyre::ensure!(
        moved.position() == Position::new(1),
        "clamped to {}",
        moved.position()
    );
    let todo = lane_titles(&service, project_id, "todo").await?;
    eyre::ensure!(todo == ["B", "A"], "unexpected todo order {todo:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn detail_edits_keep_placement(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let seeded = seed_lane(&service, project_id, "in-progress", &["draft", "other"]).await?;
    let first = seeded
        .first()
        .ok_or_else(|| eyre::eyre!("expected a seeded task"))?;

    let updated = service
        .update_details(
            UpdateTaskRequest::new(first.id())
                .with_title("final")
                .with_priority("high"),
        )
        .await?;

    eyre::ensure!(
        updated.lane() == first.lane() && updated.position() == first.position(),
        "detail edit moved the task"
    );
    eyre::ensure!(
        updated.revision() > first.revision(),
        "revision did not advance"
    );
    let lane = lane_titles(&service, project_id, "in-progress").await?;
    eyre::ensure!(lane == ["final", "other"], "unexpected lane order {lane:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_lane_is_rejected_without_side_effects(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let result = service
        .insert(InsertTaskRequest::new(project_id, "lost").in_lane("backlog"))
        .await;

    eyre::ensure!(
        matches!(result, Err(PlacementError::InvalidLane(_))),
        "expected InvalidLane, got {result:?}"
    );
    eyre::ensure!(
        service.board(project_id).await?.is_empty(),
        "rejected insert left a task behind"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn projects_do_not_share_lanes(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let other = ProjectId::new();
    seed_lane(&service, project_id, "todo", &["mine"]).await?;
    let theirs = seed_lane(&service, other, "todo", &["theirs"]).await?;

    eyre::ensure!(
        theirs.iter().all(|task| task.position() == Position::FIRST),
        "other project's lane started after ours"
    );
    let board = service.board(project_id).await?;
    eyre::ensure!(board.len() == 1, "expected one task, found {}", board.len());
    eyre::ensure!(
        is_dense(board.iter().map(Task::position)),
        "board is not dense"
    );
    Ok(())
}
