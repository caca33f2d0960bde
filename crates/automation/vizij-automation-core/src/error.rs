//! Error types for automation storage, playback and state machines

use serde::{Deserialize, Serialize};

use crate::ids::{EntityId, NameHash, RefId};

/// All failures raised by the automation core.
///
/// These are programmer-error class failures: evaluators surface them immediately and the
/// engine aborts the offending entity for the current tick.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AutomationError {
    /// Keyframe value type is zero-sized or larger than the biggest bucket
    #[error("Unsupported keyframe value size: {size} bytes (must be 1..=256)")]
    UnsupportedValueSize { size: usize },

    /// Keyframe appended with a different value type than the track already stores
    #[error("Keyframe value type mismatch: track stores {expected_size}-byte values, got {actual_size} bytes of another type")]
    ValueTypeMismatch {
        expected_size: usize,
        actual_size: usize,
    },

    /// Keyframe times and values given with different lengths
    #[error("Keyframe length mismatch: {times} times, {values} values")]
    KeyframeLengthMismatch { times: usize, values: usize },

    /// Interpolation id with no registered function
    #[error("Invalid interpolation method: {id}")]
    InvalidInterpolationMethod { id: u16 },

    /// Every method id is taken
    #[error("Interpolation registry is full ({capacity} methods)")]
    InterpolationRegistryFull { capacity: usize },

    /// Interpolation function received spans it cannot work with
    #[error("Interpolation size mismatch: needs {expected} bytes, got {actual}")]
    InterpolationSizeMismatch { expected: usize, actual: usize },

    /// Neither the stateful entity nor its machine has a usable state
    #[error("State machine {machine:?} has no entry state assigned")]
    MissingEntryState { machine: EntityId },

    /// Transition references a parameter the stateful entity does not have
    #[error("Parameter not found: {name}")]
    UnknownParameter { name: String },

    /// Name or hash does not match any state of the machine
    #[error("State not found: {name}")]
    UnknownState { name: String },

    #[error("State `{name}` already exists")]
    DuplicateState { name: String },

    #[error("Transition from `{source_state}` to `{destination}` with parameter `{parameter}` already exists")]
    DuplicateTransition {
        source_state: String,
        destination: String,
        parameter: String,
    },

    #[error("Parameter `{name}` already exists")]
    DuplicateParameter { name: String },

    /// Current state read before any state was resolved
    #[error("Stateful entity {entity:?} has no assigned state")]
    StateUnassigned { entity: EntityId },

    /// Entity lacks an automation-side component
    #[error("Entity {entity:?} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: String,
    },

    /// Reference slot does not resolve to an entity
    #[error("Reference {reference:?} on entity {entity:?} does not resolve")]
    MissingReference { entity: EntityId, reference: RefId },

    /// Target component/sequence region does not exist on the entity
    #[error("Entity {entity:?} has no region for the automation target")]
    MissingRegion { entity: EntityId },

    /// Target byte range exceeds the region
    #[error("Target bytes at offset {offset} (len {len}) exceed region of {available} bytes on entity {entity:?}")]
    RegionOutOfBounds {
        entity: EntityId,
        offset: usize,
        len: usize,
        available: usize,
    },

    /// Definition JSON could not be parsed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AutomationError {
    /// Unknown state from a name hash (evaluation only sees hashes).
    pub(crate) fn unknown_state_hash(hash: NameHash) -> Self {
        Self::UnknownState {
            name: format!("#{:08x}", hash.0),
        }
    }

    /// Unknown parameter from a name hash.
    pub(crate) fn unknown_parameter_hash(hash: NameHash) -> Self {
        Self::UnknownParameter {
            name: format!("#{:08x}", hash.0),
        }
    }

    pub(crate) fn missing_component(entity: EntityId, component: &str) -> Self {
        Self::MissingComponent {
            entity,
            component: component.to_string(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedValueSize { .. }
            | Self::ValueTypeMismatch { .. }
            | Self::KeyframeLengthMismatch { .. } => "storage",
            Self::InvalidInterpolationMethod { .. }
            | Self::InterpolationRegistryFull { .. }
            | Self::InterpolationSizeMismatch { .. } => "interpolation",
            Self::MissingEntryState { .. }
            | Self::UnknownParameter { .. }
            | Self::UnknownState { .. }
            | Self::StateUnassigned { .. } => "state",
            Self::DuplicateState { .. }
            | Self::DuplicateTransition { .. }
            | Self::DuplicateParameter { .. } => "definition",
            Self::MissingComponent { .. }
            | Self::MissingReference { .. }
            | Self::MissingRegion { .. }
            | Self::RegionOutOfBounds { .. } => "substrate",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AutomationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AutomationError::UnsupportedValueSize { size: 257 };
        assert_eq!(err.category(), "storage");

        let err = AutomationError::MissingEntryState {
            machine: EntityId(3),
        };
        assert_eq!(err.category(), "state");

        let err = AutomationError::DuplicateParameter {
            name: "speed".into(),
        };
        assert_eq!(err.category(), "definition");
    }

    #[test]
    fn test_display_mentions_names() {
        let err = AutomationError::DuplicateTransition {
            source_state: "Idle".into(),
            destination: "Walk".into(),
            parameter: "speed".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Idle") && msg.contains("Walk") && msg.contains("speed"));
    }

    #[test]
    fn test_serialization() {
        let error = AutomationError::InvalidInterpolationMethod { id: 9 };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: AutomationError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_from_serde_json() {
        let err: AutomationError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), "serialization");
    }
}
