//! Output contracts from the core engine.
//!
//! Values are written straight into the substrate, so outputs only carry the semantic
//! events of the tick: state changes, automation rebinds and per-entity failures.

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::ids::{EntityId, StateIndex};

/// Pass of the tick an event came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TickStage {
    Transitions,
    Links,
    Playback,
}

/// Discrete signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    /// State assigned (`from: None`) or a transition fired.
    StateChanged {
        entity: EntityId,
        from: Option<StateIndex>,
        to: StateIndex,
    },
    /// Player pointed at a different automation by a state link.
    AutomationBound {
        entity: EntityId,
        automation: EntityId,
    },
    /// Entity skipped for the rest of this tick.
    EntityFailed {
        entity: EntityId,
        stage: TickStage,
        error: AutomationError,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<CoreEvent>,
    /// Events dropped because of the per-tick cap.
    #[serde(default)]
    pub dropped_events: usize,
}

impl Outputs {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            dropped_events: 0,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped_events = 0;
    }

    /// Push unless `limit` events are already queued.
    #[inline]
    pub fn push_event(&mut self, event: CoreEvent, limit: usize) {
        if self.events.len() < limit {
            self.events.push(event);
        } else {
            self.dropped_events += 1;
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Failures reported this tick.
    pub fn failures(&self) -> impl Iterator<Item = (EntityId, TickStage, &AutomationError)> {
        self.events.iter().filter_map(|event| match event {
            CoreEvent::EntityFailed {
                entity,
                stage,
                error,
            } => Some((*entity, *stage, error)),
            _ => None,
        })
    }
}
