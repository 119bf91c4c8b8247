//! Adapter implementations for the subscriber registry port.

pub mod memory;
