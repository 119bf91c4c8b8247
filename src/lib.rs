//! Laneboard: ordered task lanes with realtime change propagation.
//!
//! This crate keeps the tasks of a project arranged in status lanes with a
//! dense, zero-based position per lane, and fans out one change event per
//! committed mutation to every subscriber watching the project.
//!
//! # Architecture
//!
//! Laneboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory stores, channels)
//!
//! # Modules
//!
//! - [`placement`]: Lane index, shift planning, and the placement engine
//! - [`propagation`]: Change events, subscriber registry, and client merge rules

pub mod placement;
pub mod propagation;
