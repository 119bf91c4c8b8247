//! Shared world state for board ordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use laneboard::placement::{
    adapters::memory::InMemoryLaneIndex,
    domain::{Task, TaskId, ProjectId},
    services::{PlacementConfig, PlacementError, PlacementService},
};
use laneboard::propagation::{
    adapters::memory::InMemorySubscriberRegistry,
    domain::ChangeEvent,
    services::Subscription,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBoardService =
    PlacementService<InMemoryLaneIndex, InMemorySubscriberRegistry, DefaultClock>;

/// Scenario world for board ordering behaviour tests.
pub struct BoardWorld {
    pub service: TestBoardService,
    pub project_id: ProjectId,
    pub tasks: HashMap<String, TaskId>,
    pub subscription: Option<Subscription>,
    pub received: Vec<ChangeEvent>,
    pub last_move_result: Option<Result<Task, PlacementError>>,
}

impl BoardWorld {
    /// Creates a world around a fresh board with the given configuration.
    #[must_use]
    pub fn with_config(config: PlacementConfig) -> Self {
        let service = PlacementService::with_config(
            Arc::new(InMemoryLaneIndex::new()),
            Arc::new(InMemorySubscriberRegistry::new()),
            Arc::new(DefaultClock),
            config,
        );

        Self {
            service,
            project_id: ProjectId::new(),
            tasks: HashMap::new(),
            subscription: None,
            received: Vec::new(),
            last_move_result: None,
        }
    }

    /// Resolves a task title used in the scenario to its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if no task with that title was created.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled {title:?} in scenario world"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::with_config(PlacementConfig::default())
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Splits a comma-separated list of task titles.
#[must_use]
pub fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
