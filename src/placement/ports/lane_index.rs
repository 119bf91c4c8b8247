//! Lane index port: the authoritative store of lane slot bindings.

use crate::placement::domain::{Lane, Position, ProjectId, Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for lane index operations.
pub type LaneIndexResult<T> = Result<T, LaneIndexError>;

/// Storage contract for tasks and their `(project, lane, position)` slots.
///
/// Implementations only store and query. They never shift positions on their
/// own, and a committed [`LaneBatch`] must become visible all at once.
#[async_trait]
pub trait LaneIndex: Send + Sync {
    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::Unavailable`] when the store cannot be read.
    async fn find_by_id(&self, id: TaskId) -> LaneIndexResult<Option<Task>>;

    /// Returns the lane and position currently bound to a task.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::NotFound`] when the task does not exist.
    async fn raw_position(&self, id: TaskId) -> LaneIndexResult<(Lane, Position)>;

    /// Returns the task identities of a lane sorted by ascending position.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::Unavailable`] when the store cannot be read.
    async fn positions_in_lane(
        &self,
        project_id: ProjectId,
        lane: Lane,
    ) -> LaneIndexResult<Vec<TaskId>>;

    /// Returns the tasks of a lane sorted by ascending position.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::Unavailable`] when the store cannot be read.
    async fn tasks_in_lane(&self, project_id: ProjectId, lane: Lane) -> LaneIndexResult<Vec<Task>>;

    /// Returns every task of a project sorted by lane, then position.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::Unavailable`] when the store cannot be read.
    async fn tasks_in_project(&self, project_id: ProjectId) -> LaneIndexResult<Vec<Task>>;

    /// Applies a batch of writes atomically: either every write lands or
    /// none does.
    ///
    /// # Errors
    ///
    /// Returns [`LaneIndexError::NotFound`] when a deletion targets an
    /// unknown task, [`LaneIndexError::InconsistentBatch`] when the batch
    /// would leave a lane with a gap or a duplicate position, and
    /// [`LaneIndexError::Unavailable`] when the store cannot persist it.
    async fn commit(&self, batch: LaneBatch) -> LaneIndexResult<()>;
}

/// Set of task writes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneBatch {
    upserts: Vec<Task>,
    deletions: Vec<TaskId>,
}

impl LaneBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to insert or overwrite.
    #[must_use]
    pub fn upsert(mut self, task: Task) -> Self {
        self.upserts.push(task);
        self
    }

    /// Adds several tasks to insert or overwrite.
    #[must_use]
    pub fn upsert_all(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.upserts.extend(tasks);
        self
    }

    /// Adds a task to delete.
    #[must_use]
    pub fn delete(mut self, id: TaskId) -> Self {
        self.deletions.push(id);
        self
    }

    /// Returns the tasks to insert or overwrite.
    #[must_use]
    pub fn upserts(&self) -> &[Task] {
        &self.upserts
    }

    /// Returns the task identities to delete.
    #[must_use]
    pub fn deletions(&self) -> &[TaskId] {
        &self.deletions
    }

    /// Returns `true` when the batch holds no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }

    /// Splits the batch into upserts and deletions.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Task>, Vec<TaskId>) {
        (self.upserts, self.deletions)
    }
}

/// Errors returned by lane index implementations.
#[derive(Debug, Clone, Error)]
pub enum LaneIndexError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The batch would break the density of a lane.
    #[error("batch leaves lane {lane} of project {project_id} without dense positions")]
    InconsistentBatch {
        /// Project owning the lane.
        project_id: ProjectId,
        /// Lane that would be left inconsistent.
        lane: Lane,
    },

    /// The store could not serve or persist the request.
    #[error("lane index unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl LaneIndexError {
    /// Wraps a storage failure.
    #[must_use]
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
