//! Given steps for board ordering BDD scenarios.

use super::world::{BoardWorld, run_async, titles};
use eyre::WrapErr;
use laneboard::placement::services::{InsertTaskRequest, PlacementConfig};
use rstest_bdd_macros::given;

#[given("a project board")]
fn project_board(world: &mut BoardWorld) {
    world.tasks.clear();
}

#[given("a strict project board")]
fn strict_project_board(world: &mut BoardWorld) {
    *world = BoardWorld::with_config(PlacementConfig::strict());
}

#[given(r#"lane "{lane}" holds "{list}""#)]
fn lane_holds(world: &mut BoardWorld, lane: String, list: String) -> Result<(), eyre::Report> {
    for title in titles(&list) {
        let request = InsertTaskRequest::new(world.project_id, title.clone()).in_lane(lane.clone());
        let created = run_async(world.service.insert(request))
            .wrap_err_with(|| format!("seed {title:?} into lane {lane:?}"))?;
        world.tasks.insert(title, created.id());
    }
    Ok(())
}

#[given("a subscriber watches the project")]
fn subscriber_watches(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    let subscription = world
        .service
        .subscribe(world.project_id)
        .wrap_err("subscribe to scenario project")?;
    world.subscription = Some(subscription);
    Ok(())
}
