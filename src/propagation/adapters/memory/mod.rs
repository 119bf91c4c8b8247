//! In-memory subscriber registry adapter.

mod registry;

pub use registry::InMemorySubscriberRegistry;
