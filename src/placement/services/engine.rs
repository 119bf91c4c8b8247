//! Placement engine: the single writer of lane positions.

use super::{
    config::PlacementConfig,
    locks::ProjectLocks,
    requests::{DetailsError, InsertTaskRequest, MoveTaskRequest, UpdateTaskRequest},
};
use crate::placement::{
    domain::{
        Lane, LaneOrder, ParseLaneError, ParsePriorityError, PlacementDomainError, Position,
        ProjectId, Shift, Task, TaskId, plan_insert, plan_move, plan_remove,
    },
    ports::{LaneBatch, LaneIndex, LaneIndexError},
};
use crate::propagation::{
    domain::{ChangeEvent, Displacement},
    ports::{RegistryResult, SubscriberId, SubscriberRegistry},
    services::{ChangePublisher, Subscription},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for placement operations.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PlacementDomainError),
    /// The lane name is not one of the known lanes.
    #[error(transparent)]
    InvalidLane(#[from] ParseLaneError),
    /// The priority name is not one of the known priorities.
    #[error(transparent)]
    InvalidPriority(#[from] ParsePriorityError),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The lane index refused the batch as inconsistent with its contents.
    #[error("lane index rejected the write: {0}")]
    Conflict(LaneIndexError),
    /// The lane index could not be reached; the call may be retried.
    #[error("lane index unavailable: {0}")]
    StoreUnavailable(LaneIndexError),
}

impl PlacementError {
    /// Returns `true` when retrying the whole call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<LaneIndexError> for PlacementError {
    fn from(err: LaneIndexError) -> Self {
        match err {
            LaneIndexError::NotFound(id) => Self::NotFound(id),
            LaneIndexError::InconsistentBatch { .. } => Self::Conflict(err),
            LaneIndexError::Unavailable(_) => Self::StoreUnavailable(err),
        }
    }
}

impl From<DetailsError> for PlacementError {
    fn from(err: DetailsError) -> Self {
        match err {
            DetailsError::Domain(inner) => Self::Domain(inner),
            DetailsError::Priority(inner) => Self::InvalidPriority(inner),
        }
    }
}

/// Result type for placement service operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Placement engine orchestration service.
///
/// Each mutation runs under its project's lock: it reads the affected lanes,
/// plans the shifts, commits every write as one batch, and publishes the
/// resulting change event before releasing the lock. Subscribers of a project
/// therefore receive events in commit order. Publishing never waits on a
/// subscriber, so the lock is never held up by a slow client. Failed or
/// rejected calls leave the lane index untouched and publish nothing.
pub struct PlacementService<L, R, C>
where
    L: LaneIndex,
    R: SubscriberRegistry,
    C: Clock + Send + Sync,
{
    index: Arc<L>,
    publisher: ChangePublisher<R>,
    clock: Arc<C>,
    locks: ProjectLocks,
    config: PlacementConfig,
}

impl<L, R, C> PlacementService<L, R, C>
where
    L: LaneIndex,
    R: SubscriberRegistry,
    C: Clock + Send + Sync,
{
    /// Creates a placement service with the default configuration.
    #[must_use]
    pub fn new(index: Arc<L>, registry: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_config(index, registry, clock, PlacementConfig::default())
    }

    /// Creates a placement service with a custom configuration.
    #[must_use]
    pub fn with_config(
        index: Arc<L>,
        registry: Arc<R>,
        clock: Arc<C>,
        config: PlacementConfig,
    ) -> Self {
        Self {
            index,
            publisher: ChangePublisher::new(registry, config.subscriber_buffer),
            clock,
            locks: ProjectLocks::default(),
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Inserts a new task into a lane and publishes a `created` event.
    ///
    /// Without a requested position the task is appended to the tail.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidLane`], [`PlacementError::Domain`] or
    /// [`PlacementError::InvalidPriority`] for invalid input, and
    /// [`PlacementError::StoreUnavailable`] when the batch cannot be
    /// committed.
    pub async fn insert(&self, request: InsertTaskRequest) -> PlacementResult<Task> {
        let lane = request.lane()?;
        let project_id = request.project_id();
        let requested = request.position();
        let details = request.into_details()?;

        let guard = self.locks.acquire(project_id).await;
        let neighbours = self.index.tasks_in_lane(project_id, lane).await?;
        let order = identities(&neighbours);
        let plan = plan_insert(
            LaneOrder::new(lane, &order),
            requested,
            self.config.position_policy,
        )?;

        let displaced = self.shift(&neighbours, plan.shifts())?;
        let task = Task::new(project_id, lane, plan.position(), details, &*self.clock);
        self.index
            .commit(
                LaneBatch::new()
                    .upsert_all(displaced.iter().cloned())
                    .upsert(task.clone()),
            )
            .await?;
        let report = self.publisher.publish(&ChangeEvent::created(
            task.clone(),
            displacements(&displaced),
            &*self.clock,
        ));
        drop(guard);

        tracing::debug!(
            project = %project_id,
            task = %task.id(),
            lane = %lane,
            position = %task.position(),
            shifted = displaced.len(),
            delivered = report.delivered,
            "task inserted"
        );
        Ok(task)
    }

    /// Moves a task to a slot in its own lane or another one and publishes
    /// an `updated` event.
    ///
    /// Moving a task onto the slot it already holds changes nothing and
    /// publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown task,
    /// [`PlacementError::InvalidLane`] for an unknown lane,
    /// [`PlacementError::Domain`] when the position is rejected, and
    /// [`PlacementError::StoreUnavailable`] when the batch cannot be
    /// committed.
    pub async fn move_task(&self, request: MoveTaskRequest) -> PlacementResult<Task> {
        let (task_id, target_lane, requested) = request.into_target()?;
        let project_id = self.require(task_id).await?.project_id();

        let guard = self.locks.acquire(project_id).await;
        let task = self.require(task_id).await?;
        let source_lane = task.lane();
        let source = self.index.tasks_in_lane(project_id, source_lane).await?;
        let target = if target_lane == source_lane {
            Vec::new()
        } else {
            self.index.tasks_in_lane(project_id, target_lane).await?
        };

        let source_order = identities(&source);
        let target_order = identities(&target);
        let Some(plan) = plan_move(
            task.id(),
            LaneOrder::new(source_lane, &source_order),
            Some(LaneOrder::new(target_lane, &target_order)),
            requested,
            self.config.position_policy,
        )?
        else {
            tracing::debug!(task = %task.id(), "move leaves task in place");
            return Ok(task);
        };

        let neighbours: Vec<Task> = source.into_iter().chain(target).collect();
        let displaced = self.shift(&neighbours, plan.shifts())?;
        let mut moved = task;
        moved.place(plan.lane(), plan.position(), &*self.clock);
        self.index
            .commit(
                LaneBatch::new()
                    .upsert_all(displaced.iter().cloned())
                    .upsert(moved.clone()),
            )
            .await?;
        let report = self.publisher.publish(&ChangeEvent::updated(
            moved.clone(),
            displacements(&displaced),
            &*self.clock,
        ));
        drop(guard);

        tracing::debug!(
            project = %project_id,
            task = %moved.id(),
            from = %source_lane,
            lane = %moved.lane(),
            position = %moved.position(),
            shifted = displaced.len(),
            delivered = report.delivered,
            "task moved"
        );
        Ok(moved)
    }

    /// Removes a task, closes the gap behind it, and publishes a `deleted`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown task and
    /// [`PlacementError::StoreUnavailable`] when the batch cannot be
    /// committed.
    pub async fn remove(&self, task_id: TaskId) -> PlacementResult<()> {
        let project_id = self.require(task_id).await?.project_id();

        let guard = self.locks.acquire(project_id).await;
        let task = self.require(task_id).await?;
        let source = self.index.tasks_in_lane(project_id, task.lane()).await?;
        let order = identities(&source);
        let plan = plan_remove(task_id, LaneOrder::new(task.lane(), &order))?;

        let displaced = self.shift(&source, plan.shifts())?;
        self.index
            .commit(
                LaneBatch::new()
                    .delete(task_id)
                    .upsert_all(displaced.iter().cloned()),
            )
            .await?;
        let report = self.publisher.publish(&ChangeEvent::deleted(
            project_id,
            task_id,
            task.revision().next(),
            displacements(&displaced),
            &*self.clock,
        ));
        drop(guard);

        tracing::debug!(
            project = %project_id,
            task = %task_id,
            lane = %plan.lane(),
            position = %plan.position(),
            shifted = displaced.len(),
            delivered = report.delivered,
            "task removed"
        );
        Ok(())
    }

    /// Changes task content without touching its placement and publishes an
    /// `updated` event.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown task,
    /// [`PlacementError::Domain`] for an empty title,
    /// [`PlacementError::InvalidPriority`] for an unknown priority, and
    /// [`PlacementError::StoreUnavailable`] when the write cannot be
    /// committed.
    pub async fn update_details(&self, request: UpdateTaskRequest) -> PlacementResult<Task> {
        let task_id = request.task_id();
        let project_id = self.require(task_id).await?.project_id();

        let guard = self.locks.acquire(project_id).await;
        let mut task = self.require(task_id).await?;
        let details = request.apply_to(task.details())?;
        task.replace_details(details, &*self.clock);
        self.index
            .commit(LaneBatch::new().upsert(task.clone()))
            .await?;
        let report = self
            .publisher
            .publish(&ChangeEvent::updated(task.clone(), Vec::new(), &*self.clock));
        drop(guard);

        tracing::debug!(
            project = %project_id,
            task = %task.id(),
            delivered = report.delivered,
            "task details updated"
        );
        Ok(task)
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::StoreUnavailable`] when the lookup fails.
    pub async fn find(&self, task_id: TaskId) -> PlacementResult<Option<Task>> {
        Ok(self.index.find_by_id(task_id).await?)
    }

    /// Returns the lane and position currently bound to a task.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::NotFound`] for an unknown task.
    pub async fn position_of(&self, task_id: TaskId) -> PlacementResult<(Lane, Position)> {
        Ok(self.index.raw_position(task_id).await?)
    }

    /// Returns every task of a project sorted by lane, then position.
    ///
    /// This is the full fetch a reconnecting subscriber seeds its cache with.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::StoreUnavailable`] when the lookup fails.
    pub async fn board(&self, project_id: ProjectId) -> PlacementResult<Vec<Task>> {
        Ok(self.index.tasks_in_project(project_id).await?)
    }

    /// Returns the tasks of a lane sorted by position.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidLane`] for an unknown lane and
    /// [`PlacementError::StoreUnavailable`] when the lookup fails.
    pub async fn lane(&self, project_id: ProjectId, lane: &str) -> PlacementResult<Vec<Task>> {
        let parsed = Lane::try_from(lane)?;
        Ok(self.index.tasks_in_lane(project_id, parsed).await?)
    }

    /// Returns the task identities of a lane sorted by position.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::InvalidLane`] for an unknown lane and
    /// [`PlacementError::StoreUnavailable`] when the lookup fails.
    pub async fn lane_order(
        &self,
        project_id: ProjectId,
        lane: &str,
    ) -> PlacementResult<Vec<TaskId>> {
        let parsed = Lane::try_from(lane)?;
        Ok(self.index.positions_in_lane(project_id, parsed).await?)
    }

    /// Opens a subscription to a project's change events.
    ///
    /// # Errors
    ///
    /// Returns [`crate::propagation::ports::RegistryError`] when the
    /// subscriber registry rejects the registration.
    pub fn subscribe(&self, project_id: ProjectId) -> RegistryResult<Subscription> {
        self.publisher.subscribe(project_id)
    }

    /// Closes a subscription. Returns `false` when it was not registered.
    ///
    /// # Errors
    ///
    /// Returns [`crate::propagation::ports::RegistryError`] when the
    /// subscriber registry cannot be updated.
    pub fn unsubscribe(&self, id: SubscriberId) -> RegistryResult<bool> {
        self.publisher.unsubscribe(id)
    }

    async fn require(&self, task_id: TaskId) -> PlacementResult<Task> {
        self.index
            .find_by_id(task_id)
            .await?
            .ok_or(PlacementError::NotFound(task_id))
    }

    /// Applies planned shifts to copies of the neighbour tasks.
    fn shift(&self, neighbours: &[Task], shifts: &[Shift]) -> PlacementResult<Vec<Task>> {
        let by_id: HashMap<TaskId, &Task> =
            neighbours.iter().map(|task| (task.id(), task)).collect();
        shifts
            .iter()
            .map(|shift| {
                let mut task = by_id
                    .get(&shift.task_id)
                    .map(|task| (*task).clone())
                    .ok_or(PlacementError::NotFound(shift.task_id))?;
                task.place(shift.lane, shift.position, &*self.clock);
                Ok(task)
            })
            .collect()
    }
}

fn identities(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(Task::id).collect()
}

fn displacements(tasks: &[Task]) -> Vec<Displacement> {
    tasks.iter().map(Displacement::from).collect()
}
