//! Change events emitted after committed placement mutations.

use crate::placement::domain::{Lane, Position, ProjectId, Revision, Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// What happened to the subject task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The task was inserted into a lane.
    Created,
    /// The task was moved or its content changed.
    Updated,
    /// The task was removed from its lane.
    Deleted,
}

impl ChangeKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// Returns the topic name transports publish this kind under.
    #[must_use]
    pub const fn topic(self) -> &'static str {
        match self {
            Self::Created => "task-created",
            Self::Updated => "task-updated",
            Self::Deleted => "task-deleted",
        }
    }
}

/// Post-mutation slot of a neighbour shifted by the same mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Displacement {
    /// Shifted task.
    pub task_id: TaskId,
    /// Lane the task sits in.
    pub lane: Lane,
    /// Position after the shift.
    pub position: Position,
    /// Revision the shift committed.
    pub revision: Revision,
}

impl From<&Task> for Displacement {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            lane: task.lane(),
            position: task.position(),
            revision: task.revision(),
        }
    }
}

/// Immutable record of one committed mutation.
///
/// Lane and position data always describe the lane index as it stood right
/// after the commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    kind: ChangeKind,
    project_id: ProjectId,
    task_id: TaskId,
    revision: Revision,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    displaced: Vec<Displacement>,
    occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Creates a `created` event carrying the new task.
    #[must_use]
    pub fn created(task: Task, displaced: Vec<Displacement>, clock: &impl Clock) -> Self {
        Self::with_snapshot(ChangeKind::Created, task, displaced, clock)
    }

    /// Creates an `updated` event carrying the task after the mutation.
    #[must_use]
    pub fn updated(task: Task, displaced: Vec<Displacement>, clock: &impl Clock) -> Self {
        Self::with_snapshot(ChangeKind::Updated, task, displaced, clock)
    }

    /// Creates a `deleted` event carrying only the task identity.
    ///
    /// `revision` must be greater than any revision the task held while it
    /// existed.
    #[must_use]
    pub fn deleted(
        project_id: ProjectId,
        task_id: TaskId,
        revision: Revision,
        displaced: Vec<Displacement>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            project_id,
            task_id,
            revision,
            snapshot: None,
            displaced,
            occurred_at: clock.utc(),
        }
    }

    fn with_snapshot(
        kind: ChangeKind,
        task: Task,
        displaced: Vec<Displacement>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            kind,
            project_id: task.project_id(),
            task_id: task.id(),
            revision: task.revision(),
            snapshot: Some(task),
            displaced,
            occurred_at: clock.utc(),
        }
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the project owning the task.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the subject task identity.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the subject task revision.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns the post-mutation snapshot; `None` for deletions.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&Task> {
        self.snapshot.as_ref()
    }

    /// Returns the neighbours shifted by the mutation.
    #[must_use]
    pub fn displaced(&self) -> &[Displacement] {
        &self.displaced
    }

    /// Returns when the mutation committed.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Encodes the event as a JSON payload for a transport.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the event cannot be encoded.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Decodes an event received from a transport.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload is not a change event.
    pub fn from_json(payload: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(payload)
    }
}
