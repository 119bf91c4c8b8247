//! In-memory lane index for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::placement::{
    domain::{Lane, Position, ProjectId, Task, TaskId, is_dense},
    ports::{LaneBatch, LaneIndex, LaneIndexError, LaneIndexResult},
};

/// Thread-safe in-memory lane index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLaneIndex {
    state: Arc<RwLock<InMemoryLaneState>>,
}

#[derive(Debug, Default)]
struct InMemoryLaneState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryLaneIndex {
    /// Creates an empty in-memory lane index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LaneIndexResult<RwLockReadGuard<'_, InMemoryLaneState>> {
        self.state
            .read()
            .map_err(|err| LaneIndexError::unavailable(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> LaneIndexResult<RwLockWriteGuard<'_, InMemoryLaneState>> {
        self.state
            .write()
            .map_err(|err| LaneIndexError::unavailable(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryLaneState {
    fn lane(&self, project_id: ProjectId, lane: Lane) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id && task.lane() == lane)
            .cloned()
            .collect();
        tasks.sort_by_key(Task::position);
        tasks
    }
}

/// Checks that every touched lane stays dense once `staged` is overlaid on
/// the current contents. A `None` entry in `staged` marks a deletion.
fn verify_touched_lanes(
    current: &HashMap<TaskId, Task>,
    staged: &HashMap<TaskId, Option<Task>>,
    touched: &HashSet<(ProjectId, Lane)>,
) -> LaneIndexResult<()> {
    for &(project_id, lane) in touched {
        let untouched = current
            .iter()
            .filter(|(id, _)| !staged.contains_key(*id))
            .map(|(_, task)| task);
        let positions = untouched
            .chain(staged.values().flatten())
            .filter(|task| task.project_id() == project_id && task.lane() == lane)
            .map(Task::position);
        if !is_dense(positions) {
            return Err(LaneIndexError::InconsistentBatch { project_id, lane });
        }
    }
    Ok(())
}

#[async_trait]
impl LaneIndex for InMemoryLaneIndex {
    async fn find_by_id(&self, id: TaskId) -> LaneIndexResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn raw_position(&self, id: TaskId) -> LaneIndexResult<(Lane, Position)> {
        let state = self.read()?;
        state
            .tasks
            .get(&id)
            .map(|task| (task.lane(), task.position()))
            .ok_or(LaneIndexError::NotFound(id))
    }

    async fn positions_in_lane(
        &self,
        project_id: ProjectId,
        lane: Lane,
    ) -> LaneIndexResult<Vec<TaskId>> {
        let state = self.read()?;
        Ok(state
            .lane(project_id, lane)
            .iter()
            .map(Task::id)
            .collect())
    }

    async fn tasks_in_lane(
        &self,
        project_id: ProjectId,
        lane: Lane,
    ) -> LaneIndexResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state.lane(project_id, lane))
    }

    async fn tasks_in_project(&self, project_id: ProjectId) -> LaneIndexResult<Vec<Task>> {
        let state = self.read()?;
        Ok(Lane::ALL
            .into_iter()
            .flat_map(|lane| state.lane(project_id, lane))
            .collect())
    }

    async fn commit(&self, batch: LaneBatch) -> LaneIndexResult<()> {
        let mut state = self.write()?;
        let (upserts, deletions) = batch.into_parts();

        let mut staged: HashMap<TaskId, Option<Task>> = HashMap::new();
        let mut touched: HashSet<(ProjectId, Lane)> = HashSet::new();

        for id in deletions {
            let existing = state.tasks.get(&id).ok_or(LaneIndexError::NotFound(id))?;
            touched.insert((existing.project_id(), existing.lane()));
            staged.insert(id, None);
        }
        for task in upserts {
            if let Some(existing) = state.tasks.get(&task.id()) {
                touched.insert((existing.project_id(), existing.lane()));
            }
            touched.insert((task.project_id(), task.lane()));
            staged.insert(task.id(), Some(task));
        }

        verify_touched_lanes(&state.tasks, &staged, &touched)?;

        for (id, entry) in staged {
            match entry {
                Some(task) => {
                    state.tasks.insert(id, task);
                }
                None => {
                    state.tasks.remove(&id);
                }
            }
        }
        Ok(())
    }
}
