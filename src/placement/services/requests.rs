//! Request payloads accepted by the placement engine.
//!
//! Lanes and priorities arrive as strings from the request-handling layer and
//! are parsed before any write happens.

use crate::placement::domain::{
    Lane, ParseLaneError, ParsePriorityError, PlacementDomainError, Priority, ProjectId, TaskDetails,
    TaskId,
};
use chrono::{DateTime, Utc};

/// Request payload for inserting a task into a lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTaskRequest {
    project_id: ProjectId,
    lane: Option<String>,
    position: Option<usize>,
    title: String,
    description: Option<String>,
    assignee: Option<String>,
    priority: Option<String>,
    due_date: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl InsertTaskRequest {
    /// Creates a request that appends a task to the `todo` lane.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            lane: None,
            position: None,
            title: title.into(),
            description: None,
            assignee: None,
            priority: None,
            due_date: None,
            tags: Vec::new(),
        }
    }

    /// Sets the target lane.
    #[must_use]
    pub fn in_lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    /// Sets the requested position; omitted means tail.
    #[must_use]
    pub const fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the requested position, if any.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        self.position
    }

    pub(crate) fn lane(&self) -> Result<Lane, ParseLaneError> {
        self.lane
            .as_deref()
            .map_or(Ok(Lane::Todo), Lane::try_from)
    }

    pub(crate) fn into_details(self) -> Result<TaskDetails, DetailsError> {
        let mut details = TaskDetails::new(self.title)?.with_tags(self.tags);
        if let Some(description) = self.description {
            details = details.with_description(description);
        }
        if let Some(assignee) = self.assignee {
            details = details.with_assignee(assignee);
        }
        if let Some(priority) = self.priority {
            details = details.with_priority(Priority::try_from(priority.as_str())?);
        }
        if let Some(due_date) = self.due_date {
            details = details.with_due_date(due_date);
        }
        Ok(details)
    }
}

/// Validation failures while building task details from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetailsError {
    Domain(PlacementDomainError),
    Priority(ParsePriorityError),
}

impl From<PlacementDomainError> for DetailsError {
    fn from(err: PlacementDomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ParsePriorityError> for DetailsError {
    fn from(err: ParsePriorityError) -> Self {
        Self::Priority(err)
    }
}

/// Request payload for moving a task to a lane slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskRequest {
    task_id: TaskId,
    lane: String,
    position: usize,
}

impl MoveTaskRequest {
    /// Creates a move request.
    #[must_use]
    pub fn new(task_id: TaskId, lane: impl Into<String>, position: usize) -> Self {
        Self {
            task_id,
            lane: lane.into(),
            position,
        }
    }

    /// Returns the task to move.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn into_target(self) -> Result<(TaskId, Lane, usize), ParseLaneError> {
        let lane = Lane::try_from(self.lane.as_str())?;
        Ok((self.task_id, lane, self.position))
    }
}

/// Request payload for changing task content without touching placement.
///
/// Fields left unset keep their current value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(
    clippy::option_option,
    reason = "outer None keeps the current value, inner None clears it"
)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    title: Option<String>,
    description: Option<Option<String>>,
    assignee: Option<Option<String>>,
    priority: Option<String>,
    due_date: Option<Option<DateTime<Utc>>>,
    tags: Option<Vec<String>>,
}

impl UpdateTaskRequest {
    /// Creates an update request that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            title: None,
            description: None,
            assignee: None,
            priority: None,
            due_date: None,
            tags: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description; `None` clears it.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces the assignee; `None` clears it.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Replaces the due date; `None` clears it.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Returns the task to update.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub(crate) fn apply_to(self, current: &TaskDetails) -> Result<TaskDetails, DetailsError> {
        let mut details = current.clone();
        if let Some(title) = self.title {
            details.set_title(title)?;
        }
        if let Some(description) = self.description {
            details.set_description(description);
        }
        if let Some(assignee) = self.assignee {
            details.set_assignee(assignee);
        }
        if let Some(priority) = self.priority {
            details.set_priority(Priority::try_from(priority.as_str())?);
        }
        if let Some(due_date) = self.due_date {
            details.set_due_date(due_date);
        }
        if let Some(tags) = self.tags {
            details.set_tags(tags);
        }
        Ok(details)
    }
}
