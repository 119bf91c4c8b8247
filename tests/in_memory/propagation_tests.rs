//! Change events flowing from placement mutations to subscribers.

use super::helpers::{TestService, project_id, seed_lane, service};
use laneboard::placement::{
    domain::{Lane, ProjectId, TaskId},
    services::{InsertTaskRequest, MoveTaskRequest, UpdateTaskRequest},
};
use laneboard::propagation::domain::{BoardReconciler, ChangeKind, MergeOutcome};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_mutation_emits_exactly_one_event(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let mut subscription = service.subscribe(project_id)?;

    let task = service
        .insert(InsertTaskRequest::new(project_id, "write docs"))
        .await?;
    service
        .move_task(MoveTaskRequest::new(task.id(), "review", 0))
        .await?;
    service
        .update_details(UpdateTaskRequest::new(task.id()).with_title("write more docs"))
        .await?;
    service.remove(task.id()).await?;

    let kinds: Vec<ChangeKind> = subscription
        .drain()
        .iter()
        .map(|event| event.kind())
        .collect();
    eyre::ensure!(
        kinds
            == [
                ChangeKind::Created,
                ChangeKind::Updated,
                ChangeKind::Updated,
                ChangeKind::Deleted,
            ],
        "unexpected event kinds {kinds:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn no_op_and_rejected_mutations_stay_silent(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let seeded = seed_lane(&service, project_id, "todo", &["only"]).await?;
    let only = seeded
        .first()
        .ok_or_else(|| eyre::eyre!("expected a seeded task"))?;
    let mut subscription = service.subscribe(project_id)?;

    service
        .move_task(MoveTaskRequest::new(only.id(), "todo", 0))
        .await?;
    let rejected = service
        .move_task(MoveTaskRequest::new(only.id(), "archive", 0))
        .await;
    let missing = service.remove(TaskId::new()).await;

    eyre::ensure!(rejected.is_err(), "unknown lane was accepted");
    eyre::ensure!(missing.is_err(), "unknown task was removed");
    eyre::ensure!(
        subscription.try_recv().is_none(),
        "silent operations produced an event"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribers_only_hear_their_own_project(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let other = ProjectId::new();
    let mut watching = service.subscribe(project_id)?;
    let mut elsewhere = service.subscribe(other)?;

    service
        .insert(InsertTaskRequest::new(project_id, "local"))
        .await?;

    eyre::ensure!(watching.drain().len() == 1, "subscriber missed the event");
    eyre::ensure!(
        elsewhere.try_recv().is_none(),
        "event leaked to another project"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unsubscribed_client_receives_nothing(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let mut subscription = service.subscribe(project_id)?;
    eyre::ensure!(
        service.unsubscribe(subscription.id())?,
        "subscription was not registered"
    );

    service
        .insert(InsertTaskRequest::new(project_id, "unheard"))
        .await?;

    eyre::ensure!(
        subscription.recv().await.is_none(),
        "closed subscription still received events"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconciled_cache_converges_with_the_board(
    service: TestService,
    project_id: ProjectId,
) -> Result<(), eyre::Report> {
    let mut subscription = service.subscribe(project_id)?;
    let todo = seed_lane(&service, project_id, "todo", &["A", "B", "C"]).await?;
    seed_lane(&service, project_id, "done", &["D"]).await?;

    let mut cache = BoardReconciler::new(project_id);
    cache.seed(service.board(project_id).await?);

    let [a, b, c] = <[_; 3]>::try_from(todo)
        .map_err(|_| eyre::eyre!("expected three seeded tasks"))?;
    service
        .move_task(MoveTaskRequest::new(c.id(), "todo", 0))
        .await?;
    service
        .move_task(MoveTaskRequest::new(b.id(), "done", 0))
        .await?;
    service.remove(a.id()).await?;

    let mut applied = 0;
    for event in subscription.drain() {
        if cache.apply(&event) == MergeOutcome::Applied {
            applied += 1;
        }
    }
    eyre::ensure!(applied == 3, "expected three fresh events, applied {applied}");

    for lane in Lane::ALL {
        let cached: Vec<TaskId> = cache.lane(lane).iter().map(|task| task.id()).collect();
        let stored = service.lane_order(project_id, lane.as_str()).await?;
        eyre::ensure!(cached == stored, "lane {lane} diverged: {cached:?} vs {stored:?}");
    }
    eyre::ensure!(
        cache.tombstone(a.id()).is_some(),
        "removed task left no tombstone"
    );
    Ok(())
}
