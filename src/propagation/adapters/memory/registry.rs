//! In-memory subscriber registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::placement::domain::ProjectId;
use crate::propagation::ports::{
    RegistryError, RegistryResult, SubscriberChannel, SubscriberId, SubscriberRegistry,
};

/// Thread-safe in-memory registry of live subscribers keyed by project.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriberRegistry {
    state: Arc<RwLock<HashMap<ProjectId, Vec<SubscriberChannel>>>>,
}

impl InMemorySubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(err: impl ToString) -> RegistryError {
    RegistryError::unavailable(std::io::Error::other(err.to_string()))
}

impl SubscriberRegistry for InMemorySubscriberRegistry {
    fn register(&self, channel: SubscriberChannel) -> RegistryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .entry(channel.project_id())
            .or_default()
            .push(channel);
        Ok(())
    }

    fn unregister(&self, id: SubscriberId) -> RegistryResult<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        let mut removed = false;
        state.retain(|_, channels| {
            let before = channels.len();
            channels.retain(|channel| channel.id() != id);
            removed |= channels.len() != before;
            !channels.is_empty()
        });
        Ok(removed)
    }

    fn channels_for(&self, project_id: ProjectId) -> RegistryResult<Vec<SubscriberChannel>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.get(&project_id).cloned().unwrap_or_default())
    }
}
