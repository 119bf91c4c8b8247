//! Then steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async, titles};
use laneboard::placement::{
    domain::{Lane, PlacementDomainError, Position},
    services::PlacementError,
};
use rstest_bdd_macros::then;

#[then(r#"lane "{lane}" reads "{list}""#)]
fn lane_reads(world: &BoardWorld, lane: String, list: String) -> Result<(), eyre::Report> {
    let tasks = run_async(world.service.lane(world.project_id, &lane))?;
    let actual: Vec<String> = tasks
        .iter()
        .map(|task| task.details().title().to_owned())
        .collect();
    let expected = titles(&list);

    if actual != expected {
        return Err(eyre::eyre!(
            "lane {lane} reads {actual:?}, expected {expected:?}"
        ));
    }
    Ok(())
}

#[then(r#""{title}" sits at "{lane}" position {position:usize}"#)]
fn task_sits_at(
    world: &BoardWorld,
    title: String,
    lane: String,
    position: usize,
) -> Result<(), eyre::Report> {
    let expected_lane = Lane::try_from(lane.as_str())
        .map_err(|err| eyre::eyre!("invalid lane in scenario: {err}"))?;
    let binding = run_async(world.service.position_of(world.task_id(&title)?))?;

    if binding != (expected_lane, Position::new(position)) {
        return Err(eyre::eyre!(
            "{title} sits at {} position {}, expected {lane} position {position}",
            binding.0,
            binding.1
        ));
    }
    Ok(())
}

#[then(r#"the subscriber receives {count:usize} "{kind}" event"#)]
fn subscriber_receives(
    world: &mut BoardWorld,
    count: usize,
    kind: String,
) -> Result<(), eyre::Report> {
    let subscription = world
        .subscription
        .as_mut()
        .ok_or_else(|| eyre::eyre!("missing subscription in scenario world"))?;
    let received = subscription.drain();

    if received.len() != count || received.iter().any(|event| event.kind().as_str() != kind) {
        let kinds: Vec<&str> = received.iter().map(|event| event.kind().as_str()).collect();
        return Err(eyre::eyre!(
            "expected {count} {kind} events, received {kinds:?}"
        ));
    }
    world.received = received;
    Ok(())
}

#[then(r#"the event reports "{title}" displaced to position {position:usize}"#)]
fn event_reports_displacement(
    world: &BoardWorld,
    title: String,
    position: usize,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let event = world
        .received
        .last()
        .ok_or_else(|| eyre::eyre!("no event received in scenario"))?;
    let displacement = event
        .displaced()
        .iter()
        .find(|displacement| displacement.task_id == task_id)
        .ok_or_else(|| eyre::eyre!("{title} missing from displaced list"))?;

    if displacement.position != Position::new(position) {
        return Err(eyre::eyre!(
            "{title} displaced to {}, expected {position}",
            displacement.position
        ));
    }
    Ok(())
}

#[then("the move fails with an invalid position error")]
fn move_fails_with_invalid_position(world: &BoardWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(
        result,
        Err(PlacementError::Domain(
            PlacementDomainError::InvalidPosition { .. }
        ))
    ) {
        return Err(eyre::eyre!(
            "expected InvalidPosition error, got {result:?}"
        ));
    }
    Ok(())
}
