//! Application services for change fan-out.

mod publisher;

pub use publisher::{ChangePublisher, PublishReport, Subscription};
