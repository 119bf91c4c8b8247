//! Task aggregate root and its ordering-irrelevant payload.

use super::{Lane, PlacementDomainError, Position, Priority, ProjectId, Revision, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Descriptive task content. None of these fields influence ordering.
///
/// Deserialized details pass the same title validation as constructed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireTaskDetails")]
pub struct TaskDetails {
    title: String,
    description: Option<String>,
    assignee: Option<String>,
    priority: Priority,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl TaskDetails {
    /// Creates task details with a validated title and default metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn new(title: impl Into<String>) -> Result<Self, PlacementDomainError> {
        Ok(Self {
            title: normalize_title(title.into())?,
            description: None,
            assignee: None,
            priority: Priority::default(),
            due_date: None,
            tags: Vec::new(),
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the task tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementDomainError::EmptyTitle`] when the title is empty
    /// after trimming.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), PlacementDomainError> {
        self.title = normalize_title(title.into())?;
        Ok(())
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Replaces the assignee.
    pub fn set_assignee(&mut self, assignee: Option<String>) {
        self.assignee = assignee;
    }

    /// Replaces the priority.
    pub const fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    /// Replaces the due date.
    pub const fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
    }

    /// Replaces the tags.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }
}

#[derive(Deserialize)]
struct WireTaskDetails {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<WireTaskDetails> for TaskDetails {
    type Error = PlacementDomainError;

    fn try_from(wire: WireTaskDetails) -> Result<Self, Self::Error> {
        Ok(Self {
            title: normalize_title(wire.title)?,
            description: wire.description,
            assignee: wire.assignee,
            priority: wire.priority,
            due_date: wire.due_date,
            tags: wire.tags,
        })
    }
}

fn normalize_title(raw: String) -> Result<String, PlacementDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PlacementDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    lane: Lane,
    position: Position,
    revision: Revision,
    details: TaskDetails,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Persisted lane.
    pub lane: Lane,
    /// Persisted position within the lane.
    pub position: Position,
    /// Persisted revision.
    pub revision: Revision,
    /// Persisted task content.
    pub details: TaskDetails,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task bound to the given lane slot.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        lane: Lane,
        position: Position,
        details: TaskDetails,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            project_id,
            lane,
            position,
            revision: Revision::INITIAL,
            details,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            lane: data.lane,
            position: data.position,
            revision: data.revision,
            details: data.details,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the lane the task is filed under.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Returns the position within the lane.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the current revision.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns the task content.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Rebinds the task to a lane slot and advances its revision.
    ///
    /// Only the placement engine calls this; everything else sees positions
    /// read-only.
    pub(crate) fn place(&mut self, lane: Lane, position: Position, clock: &impl Clock) {
        self.lane = lane;
        self.position = position;
        self.bump(clock);
    }

    /// Replaces the task content and advances its revision.
    pub(crate) fn replace_details(&mut self, details: TaskDetails, clock: &impl Clock) {
        self.details = details;
        self.bump(clock);
    }

    /// Copies a slot binding observed elsewhere without touching timestamps.
    pub(crate) const fn rebind(&mut self, lane: Lane, position: Position, revision: Revision) {
        self.lane = lane;
        self.position = position;
        self.revision = revision;
    }

    fn bump(&mut self, clock: &impl Clock) {
        self.revision = self.revision.next();
        self.updated_at = clock.utc();
    }
}
