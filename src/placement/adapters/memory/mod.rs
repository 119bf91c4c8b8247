//! In-memory lane index adapter.

mod lane_index;

pub use lane_index::InMemoryLaneIndex;
