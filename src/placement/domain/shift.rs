//! Shift planning over dense lane orderings.
//!
//! The planner works on snapshots of lane order (task identities sorted by
//! position) and never touches storage. Each plan lists the slot the subject
//! task ends up in plus every other task whose position changes, so a store
//! can apply the whole plan as one atomic batch.

use super::{Lane, PlacementDomainError, Position, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handling of a requested position that lies outside the lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Pull the position back to the nearest valid bound.
    #[default]
    Clamp,
    /// Fail with [`PlacementDomainError::InvalidPosition`].
    Reject,
}

impl PositionPolicy {
    /// Resolves a requested position against the largest valid one.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::InvalidPosition`] when the policy is
    /// [`PositionPolicy::Reject`] and `requested` exceeds `max`.
    pub const fn resolve(self, requested: usize, max: usize) -> Result<Position, PlacementDomainError> {
        if requested <= max {
            return Ok(Position::new(requested));
        }
        match self {
            Self::Clamp => Ok(Position::new(max)),
            Self::Reject => Err(PlacementDomainError::InvalidPosition { requested, max }),
        }
    }
}

/// Ordered snapshot of one lane.
#[derive(Debug, Clone, Copy)]
pub struct LaneOrder<'a> {
    /// Lane the snapshot belongs to.
    pub lane: Lane,
    /// Task identities sorted by ascending position.
    pub tasks: &'a [TaskId],
}

impl<'a> LaneOrder<'a> {
    /// Creates a lane snapshot.
    #[must_use]
    pub const fn new(lane: Lane, tasks: &'a [TaskId]) -> Self {
        Self { lane, tasks }
    }

    fn index_of(&self, task_id: TaskId) -> Result<usize, PlacementDomainError> {
        self.tasks
            .iter()
            .position(|id| *id == task_id)
            .ok_or(PlacementDomainError::TaskNotInLane {
                task_id,
                lane: self.lane,
            })
    }
}

/// New slot for a task displaced by someone else's mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shift {
    /// Displaced task.
    pub task_id: TaskId,
    /// Lane the task stays in.
    pub lane: Lane,
    /// Position after the shift.
    pub position: Position,
}

/// Outcome of planning a single insert, move, or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPlan {
    lane: Lane,
    position: Position,
    shifts: Vec<Shift>,
}

impl PlacementPlan {
    /// Lane of the subject task after the mutation (or the lane it left).
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Position of the subject task after the mutation (or the slot it left).
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Neighbours whose position changes.
    #[must_use]
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// Consumes the plan and returns the neighbour shifts.
    #[must_use]
    pub fn into_shifts(self) -> Vec<Shift> {
        self.shifts
    }
}

/// Plans inserting a new task into a lane.
///
/// With no requested position the task goes to the tail. Every task at or
/// after the chosen slot moves down by one.
///
/// # Errors
///
/// Returns [`PlacementDomainError::InvalidPosition`] when the policy rejects
/// an out-of-range request.
pub fn plan_insert(
    target: LaneOrder<'_>,
    requested: Option<usize>,
    policy: PositionPolicy,
) -> Result<PlacementPlan, PlacementDomainError> {
    let size = target.tasks.len();
    let position = match requested {
        Some(value) => policy.resolve(value, size)?,
        None => Position::new(size),
    };

    let shifts = target
        .tasks
        .iter()
        .enumerate()
        .skip(position.value())
        .map(|(index, task_id)| Shift {
            task_id: *task_id,
            lane: target.lane,
            position: Position::new(index + 1),
        })
        .collect();

    Ok(PlacementPlan {
        lane: target.lane,
        position,
        shifts,
    })
}

/// Plans moving a task to a slot in its own lane or another one.
///
/// Pass `None` as `target` for a move within `source`. Returns `Ok(None)`
/// when the task already sits at the resolved slot.
///
/// # Errors
///
/// Returns [`PlacementDomainError::TaskNotInLane`] when `source` does not
/// contain the task, or [`PlacementDomainError::InvalidPosition`] when the
/// policy rejects an out-of-range request.
pub fn plan_move(
    task_id: TaskId,
    source: LaneOrder<'_>,
    target: Option<LaneOrder<'_>>,
    requested: usize,
    policy: PositionPolicy,
) -> Result<Option<PlacementPlan>, PlacementDomainError> {
    let from = source.index_of(task_id)?;

    let Some(other) = target.filter(|lane| lane.lane != source.lane) else {
        let max = source.tasks.len().saturating_sub(1);
        let position = policy.resolve(requested, max)?;
        if position.value() == from {
            return Ok(None);
        }
        let mut reordered = source.tasks.to_vec();
        reordered.remove(from);
        reordered.insert(position.value(), task_id);
        return Ok(Some(PlacementPlan {
            lane: source.lane,
            position,
            shifts: diff(source.lane, source.tasks, &reordered, task_id),
        }));
    };

    let position = policy.resolve(requested, other.tasks.len())?;

    let mut vacated = source.tasks.to_vec();
    vacated.remove(from);
    let mut opened = other.tasks.to_vec();
    opened.insert(position.value(), task_id);

    let mut shifts = diff(source.lane, source.tasks, &vacated, task_id);
    shifts.extend(diff(other.lane, other.tasks, &opened, task_id));

    Ok(Some(PlacementPlan {
        lane: other.lane,
        position,
        shifts,
    }))
}

/// Plans removing a task, closing the gap it leaves behind.
///
/// # Errors
///
/// Returns [`PlacementDomainError::TaskNotInLane`] when `source` does not
/// contain the task.
pub fn plan_remove(
    task_id: TaskId,
    source: LaneOrder<'_>,
) -> Result<PlacementPlan, PlacementDomainError> {
    let from = source.index_of(task_id)?;
    let mut vacated = source.tasks.to_vec();
    vacated.remove(from);
    Ok(PlacementPlan {
        lane: source.lane,
        position: Position::new(from),
        shifts: diff(source.lane, source.tasks, &vacated, task_id),
    })
}

/// Returns `true` when the positions are exactly `0..len` with no repeats.
#[must_use]
pub fn is_dense(positions: impl IntoIterator<Item = Position>) -> bool {
    let mut sorted: Vec<Position> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| position.value() == index)
}

/// Lists every task other than `subject` whose index differs between the two
/// orderings.
fn diff(lane: Lane, before: &[TaskId], after: &[TaskId], subject: TaskId) -> Vec<Shift> {
    let previous: HashMap<TaskId, usize> = before
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    after
        .iter()
        .enumerate()
        .filter(|(index, id)| **id != subject && previous.get(*id) != Some(index))
        .map(|(index, id)| Shift {
            task_id: *id,
            lane,
            position: Position::new(index),
        })
        .collect()
}
