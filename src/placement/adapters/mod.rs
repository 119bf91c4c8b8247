//! Adapter implementations for the lane index port.

pub mod memory;
