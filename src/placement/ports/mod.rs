//! Port contracts for ordered task placement.
//!
//! Ports define infrastructure-agnostic interfaces used by the placement
//! engine.

pub mod lane_index;

pub use lane_index::{LaneBatch, LaneIndex, LaneIndexError, LaneIndexResult};
