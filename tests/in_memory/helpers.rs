//! Shared helpers for in-memory integration tests.

use std::sync::Arc;

use laneboard::placement::{
    adapters::memory::InMemoryLaneIndex,
    domain::{Task, TaskId, ProjectId},
    services::{InsertTaskRequest, PlacementService},
};
use laneboard::propagation::adapters::memory::InMemorySubscriberRegistry;
use mockable::DefaultClock;
use rstest::fixture;

/// Service type wired with in-memory adapters.
pub type TestService =
    PlacementService<InMemoryLaneIndex, InMemorySubscriberRegistry, DefaultClock>;

/// Provides a fresh service for each test.
#[fixture]
pub fn service() -> TestService {
    PlacementService::new(
        Arc::new(InMemoryLaneIndex::new()),
        Arc::new(InMemorySubscriberRegistry::new()),
        Arc::new(DefaultClock),
    )
}

/// Provides a project ID for tests.
#[fixture]
pub fn project_id() -> ProjectId {
    ProjectId::new()
}

/// Appends one task per title to a lane and returns them in insertion order.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn seed_lane(
    service: &TestService,
    project_id: ProjectId,
    lane: &str,
    titles: &[&str],
) -> Result<Vec<Task>, eyre::Report> {
    let mut created = Vec::with_capacity(titles.len());
    for title in titles {
        let task = service
            .insert(InsertTaskRequest::new(project_id, *title).in_lane(lane))
            .await?;
        created.push(task);
    }
    Ok(created)
}

/// Returns the titles of a lane in position order.
///
/// # Errors
///
/// Returns an error if the lane query fails.
pub async fn lane_titles(
    service: &TestService,
    project_id: ProjectId,
    lane: &str,
) -> Result<Vec<String>, eyre::Report> {
    let tasks = service.lane(project_id, lane).await?;
    Ok(tasks
        .iter()
        .map(|task| task.details().title().to_owned())
        .collect())
}

/// Returns the identities of tasks in the given order.
#[must_use]
pub fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(Task::id).collect()
}
