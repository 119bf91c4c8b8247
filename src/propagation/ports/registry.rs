//! Subscriber registry port: live channels keyed by project.

use crate::placement::domain::ProjectId;
use crate::propagation::domain::ChangeEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Result type for subscriber registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Identifier of one live subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Creates a new random subscriber identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of a subscriber connection.
#[derive(Debug, Clone)]
pub struct SubscriberChannel {
    id: SubscriberId,
    project_id: ProjectId,
    sender: mpsc::Sender<ChangeEvent>,
}

impl SubscriberChannel {
    /// Creates a channel handle for a project subscriber.
    #[must_use]
    pub const fn new(
        id: SubscriberId,
        project_id: ProjectId,
        sender: mpsc::Sender<ChangeEvent>,
    ) -> Self {
        Self {
            id,
            project_id,
            sender,
        }
    }

    /// Returns the subscriber identifier.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the project the subscriber watches.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the event sender.
    #[must_use]
    pub const fn sender(&self) -> &mpsc::Sender<ChangeEvent> {
        &self.sender
    }
}

/// Registry of live subscriber channels.
///
/// Injected into the publisher so deployments and tests can choose their own
/// bookkeeping.
#[cfg_attr(test, mockall::automock)]
pub trait SubscriberRegistry: Send + Sync {
    /// Registers a channel under its project.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry cannot be
    /// updated.
    fn register(&self, channel: SubscriberChannel) -> RegistryResult<()>;

    /// Removes a channel. Returns `false` when it was not registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry cannot be
    /// updated.
    fn unregister(&self, id: SubscriberId) -> RegistryResult<bool>;

    /// Returns the channels currently registered for a project.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry cannot be
    /// read.
    fn channels_for(&self, project_id: ProjectId) -> RegistryResult<Vec<SubscriberChannel>>;
}

/// Errors returned by subscriber registry implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The registry could not be read or updated.
    #[error("subscriber registry unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps a registry failure.
    #[must_use]
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
