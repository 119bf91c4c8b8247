//! Ordered task placement for project boards.
//!
//! Every task lives in exactly one lane of its project and holds a position
//! in that lane. For a lane of `N` tasks the positions are always exactly
//! `0..N`, no matter how many inserts, moves, and removals have happened. The
//! module follows hexagonal architecture:
//!
//! - Domain types and the pure shift planner in [`domain`]
//! - Lane index port contract in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The placement engine in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
