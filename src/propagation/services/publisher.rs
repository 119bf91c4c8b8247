//! Send-and-forget fan-out of change events to project subscribers.

use crate::placement::domain::ProjectId;
use crate::propagation::{
    domain::ChangeEvent,
    ports::{RegistryResult, SubscriberChannel, SubscriberId, SubscriberRegistry},
};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Receiving end of a project subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    project_id: ProjectId,
    receiver: mpsc::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Returns the subscriber identifier.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Returns the watched project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Waits for the next event. Returns `None` once the subscription has
    /// been dropped from the registry and drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns every buffered event without waiting.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Per-publish delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers that received the event.
    pub delivered: usize,
    /// Subscribers whose buffer was full; they miss this event.
    pub missed: usize,
    /// Subscribers found disconnected and removed from the registry.
    pub pruned: usize,
}

/// Fans committed change events out to the subscribers of a project.
///
/// Publishing never blocks and never fails the caller: full buffers lose the
/// event, closed channels are pruned, and a registry failure drops the event.
pub struct ChangePublisher<R>
where
    R: SubscriberRegistry,
{
    registry: Arc<R>,
    buffer: usize,
}

impl<R> ChangePublisher<R>
where
    R: SubscriberRegistry,
{
    /// Creates a publisher whose subscriptions buffer up to `buffer` events.
    ///
    /// A zero buffer is raised to one.
    #[must_use]
    pub fn new(registry: Arc<R>, buffer: usize) -> Self {
        Self {
            registry,
            buffer: buffer.max(1),
        }
    }

    /// Returns the injected registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Opens a subscription to a project's change stream.
    ///
    /// # Errors
    ///
    /// Returns [`crate::propagation::ports::RegistryError`] when the registry
    /// rejects the registration.
    pub fn subscribe(&self, project_id: ProjectId) -> RegistryResult<Subscription> {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = SubscriberId::new();
        self.registry
            .register(SubscriberChannel::new(id, project_id, sender))?;
        tracing::debug!(subscriber = %id, project = %project_id, "subscriber registered");
        Ok(Subscription {
            id,
            project_id,
            receiver,
        })
    }

    /// Closes a subscription. Returns `false` when it was not registered.
    ///
    /// # Errors
    ///
    /// Returns [`crate::propagation::ports::RegistryError`] when the registry
    /// cannot be updated.
    pub fn unsubscribe(&self, id: SubscriberId) -> RegistryResult<bool> {
        let removed = self.registry.unregister(id)?;
        if removed {
            tracing::debug!(subscriber = %id, "subscriber unregistered");
        }
        Ok(removed)
    }

    /// Delivers an event to every live subscriber of its project.
    #[must_use]
    pub fn publish(&self, event: &ChangeEvent) -> PublishReport {
        let mut report = PublishReport::default();
        let channels = match self.registry.channels_for(event.project_id()) {
            Ok(channels) => channels,
            Err(err) => {
                tracing::warn!(
                    project = %event.project_id(),
                    task = %event.task_id(),
                    error = %err,
                    "dropping change event, subscriber registry unavailable"
                );
                return report;
            }
        };

        for channel in channels {
            match channel.sender().try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.missed += 1;
                    tracing::warn!(
                        subscriber = %channel.id(),
                        task = %event.task_id(),
                        "subscriber buffer full, event not delivered"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.pruned += 1;
                    self.prune(channel.id());
                }
            }
        }

        tracing::trace!(
            project = %event.project_id(),
            task = %event.task_id(),
            kind = event.kind().as_str(),
            delivered = report.delivered,
            "change event published"
        );
        report
    }

    fn prune(&self, id: SubscriberId) {
        self.registry.unregister(id).map_or_else(
            |err| tracing::warn!(subscriber = %id, error = %err, "failed to prune subscriber"),
            |_| tracing::warn!(subscriber = %id, "pruned disconnected subscriber"),
        );
    }
}
