//! Placement engine configuration.

use crate::placement::domain::PositionPolicy;
use serde::{Deserialize, Serialize};

/// Tunables for the placement engine and its change publisher.
///
/// # Examples
///
/// ```
/// use laneboard::placement::domain::PositionPolicy;
/// use laneboard::placement::services::PlacementConfig;
///
/// let config = PlacementConfig::default();
/// assert_eq!(config.position_policy, PositionPolicy::Clamp);
///
/// let strict = PlacementConfig::strict();
/// assert_eq!(strict.position_policy, PositionPolicy::Reject);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Handling of requested positions outside the lane.
    pub position_policy: PositionPolicy,
    /// Events buffered per subscriber before further events are dropped.
    pub subscriber_buffer: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            position_policy: PositionPolicy::Clamp,
            subscriber_buffer: 64,
        }
    }
}

impl PlacementConfig {
    /// Creates a configuration that rejects out-of-range positions.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            position_policy: PositionPolicy::Reject,
            ..Self::default()
        }
    }

    /// Sets the per-subscriber buffer size.
    #[must_use]
    pub const fn with_subscriber_buffer(mut self, subscriber_buffer: usize) -> Self {
        self.subscriber_buffer = subscriber_buffer;
        self
    }
}
