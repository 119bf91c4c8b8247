//! Port contracts for change propagation.

pub mod registry;

pub use registry::{
    RegistryError, RegistryResult, SubscriberChannel, SubscriberId, SubscriberRegistry,
};

#[cfg(test)]
pub use registry::MockSubscriberRegistry;
