//! Error types for placement domain validation and parsing.

use super::{Lane, TaskId};
use thiserror::Error;

/// Errors returned while validating placement requests and task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementDomainError {
    /// The requested position lies outside the lane and the active policy
    /// rejects rather than clamps.
    #[error("invalid position {requested}, expected a value in 0..={max}")]
    InvalidPosition {
        /// Position supplied by the caller.
        requested: usize,
        /// Largest position accepted for the lane.
        max: usize,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The lane snapshot handed to the planner does not contain the task.
    #[error("task {task_id} is not present in lane {lane}")]
    TaskNotInLane {
        /// Task that was expected in the lane.
        task_id: TaskId,
        /// Lane the task claims to be filed under.
        lane: Lane,
    },
}

/// Error returned while parsing a lane name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lane: {0}")]
pub struct ParseLaneError(pub String);

/// Error returned while parsing a task priority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);
