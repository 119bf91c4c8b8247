//! Domain model for ordered task placement.
//!
//! Tasks, lanes, and the pure shift planner live here. Nothing in this module
//! reaches storage; the planner computes which positions change and the
//! placement service hands the result to the lane index as one batch.

mod error;
mod ids;
mod lane;
mod shift;
mod task;

pub use error::{ParseLaneError, ParsePriorityError, PlacementDomainError};
pub use ids::{Position, ProjectId, Revision, TaskId};
pub use lane::{Lane, Priority};
pub use shift::{
    LaneOrder, PlacementPlan, PositionPolicy, Shift, is_dense, plan_insert, plan_move,
    plan_remove,
};
pub use task::{PersistedTaskData, Task, TaskDetails};
