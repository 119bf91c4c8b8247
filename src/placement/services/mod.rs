//! Application services for ordered task placement.

mod config;
mod engine;
pub(crate) mod locks;
mod requests;

pub use config::PlacementConfig;
pub use engine::{PlacementError, PlacementResult, PlacementService};
pub use requests::{InsertTaskRequest, MoveTaskRequest, UpdateTaskRequest};
