//! Realtime propagation of board changes.
//!
//! Every committed placement mutation produces exactly one [`ChangeEvent`]
//! that is fanned out to the subscribers of the owning project. Delivery is
//! send-and-forget: no durable queue, no replay. A subscriber that reconnects
//! re-fetches the board and merges live events with [`BoardReconciler`].
//!
//! - Event and merge types in [`domain`]
//! - Subscriber registry port in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Fan-out service in [`services`]
//!
//! [`ChangeEvent`]: domain::ChangeEvent
//! [`BoardReconciler`]: domain::BoardReconciler

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
