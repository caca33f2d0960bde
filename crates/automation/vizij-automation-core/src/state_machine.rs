//! State machine definitions: named states and guarded transitions.

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::ids::{EntityId, NameHash, StateIndex};
use crate::Result;

/// Comparison between a parameter value and a transition threshold.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    /// Never fires.
    #[default]
    None,
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl Condition {
    #[inline]
    pub fn evaluate(self, value: f32, threshold: f32) -> bool {
        match self {
            Condition::None => false,
            Condition::Equal => value == threshold,
            Condition::NotEqual => value != threshold,
            Condition::LessThan => value < threshold,
            Condition::LessOrEqual => value <= threshold,
            Condition::GreaterThan => value > threshold,
            Condition::GreaterOrEqual => value >= threshold,
        }
    }
}

/// Edge between two states, keyed by the name hashes of source, destination and parameter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub source_hash: NameHash,
    pub dest_hash: NameHash,
    pub parameter_hash: NameHash,
    pub condition: Condition,
    pub threshold: f32,
}

impl Transition {
    fn key(&self) -> (NameHash, NameHash, NameHash) {
        (self.source_hash, self.dest_hash, self.parameter_hash)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct State {
    name: String,
    hash: NameHash,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMachine {
    states: Vec<State>,
    entry_state: Option<StateIndex>,
    transitions: Vec<Transition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a state; names are unique.
    pub fn add_state(&mut self, name: &str) -> Result<StateIndex> {
        if self.contains_state(name) {
            return Err(AutomationError::DuplicateState {
                name: name.to_string(),
            });
        }
        self.states.push(State {
            name: name.to_string(),
            hash: NameHash::of(name),
        });
        Ok(StateIndex::from_position(self.states.len() - 1))
    }

    pub fn contains_state(&self, name: &str) -> bool {
        self.state_index(name).is_some()
    }

    pub fn state_index(&self, name: &str) -> Option<StateIndex> {
        self.find_state_by_hash(NameHash::of(name))
    }

    pub fn find_state_by_hash(&self, hash: NameHash) -> Option<StateIndex> {
        self.states
            .iter()
            .position(|s| s.hash == hash)
            .map(StateIndex::from_position)
    }

    pub fn state_name(&self, index: StateIndex) -> Option<&str> {
        self.states.get(index.position()).map(|s| s.name.as_str())
    }

    pub fn state_hash(&self, index: StateIndex) -> Option<NameHash> {
        self.states.get(index.position()).map(|s| s.hash)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn set_entry_state(&mut self, name: &str) -> Result<()> {
        let index = self
            .state_index(name)
            .ok_or_else(|| AutomationError::UnknownState {
                name: name.to_string(),
            })?;
        self.entry_state = Some(index);
        Ok(())
    }

    #[inline]
    pub fn entry_state(&self) -> Option<StateIndex> {
        self.entry_state
    }

    /// Entry state name; `machine` only labels the error.
    pub fn entry_state_name(&self, machine: EntityId) -> Result<&str> {
        self.entry_state
            .and_then(|index| self.state_name(index))
            .ok_or(AutomationError::MissingEntryState { machine })
    }

    /// Append a transition. States are not validated here; an unknown destination
    /// surfaces when the transition fires.
    pub fn add_transition(
        &mut self,
        source: &str,
        destination: &str,
        parameter: &str,
        condition: Condition,
        threshold: f32,
    ) -> Result<()> {
        let transition = Transition {
            source_hash: NameHash::of(source),
            dest_hash: NameHash::of(destination),
            parameter_hash: NameHash::of(parameter),
            condition,
            threshold,
        };
        if self.transitions.iter().any(|t| t.key() == transition.key()) {
            return Err(AutomationError::DuplicateTransition {
                source_state: source.to_string(),
                destination: destination.to_string(),
                parameter: parameter.to_string(),
            });
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn contains_transition(&self, source: &str, destination: &str, parameter: &str) -> bool {
        self.transition(source, destination, parameter).is_some()
    }

    pub fn transition(
        &self,
        source: &str,
        destination: &str,
        parameter: &str,
    ) -> Option<&Transition> {
        let key = (
            NameHash::of(source),
            NameHash::of(destination),
            NameHash::of(parameter),
        );
        self.transitions.iter().find(|t| t.key() == key)
    }

    /// Mutable access for retuning condition/threshold in place.
    pub fn transition_mut(
        &mut self,
        source: &str,
        destination: &str,
        parameter: &str,
    ) -> Option<&mut Transition> {
        let key = (
            NameHash::of(source),
            NameHash::of(destination),
            NameHash::of(parameter),
        );
        self.transitions.iter_mut().find(|t| t.key() == key)
    }

    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> StateMachine {
        let mut sm = StateMachine::new();
        sm.add_state("Idle").unwrap();
        sm.add_state("Walk").unwrap();
        sm
    }

    #[test]
    fn states_are_unique_and_one_based() {
        let mut sm = machine();
        assert_eq!(sm.state_index("Walk").map(StateIndex::get), Some(2));
        assert_eq!(
            sm.add_state("Idle"),
            Err(AutomationError::DuplicateState {
                name: "Idle".into()
            })
        );
        assert_eq!(sm.state_count(), 2);
    }

    #[test]
    fn entry_state_must_exist() {
        let mut sm = machine();
        assert_eq!(
            sm.entry_state_name(EntityId(0)),
            Err(AutomationError::MissingEntryState {
                machine: EntityId(0)
            })
        );
        assert!(sm.set_entry_state("Run").is_err());
        sm.set_entry_state("Walk").unwrap();
        assert_eq!(sm.entry_state_name(EntityId(0)), Ok("Walk"));
    }

    #[test]
    fn duplicate_transition_keys_are_rejected() {
        let mut sm = machine();
        sm.add_transition("Idle", "Walk", "speed", Condition::GreaterThan, 0.0)
            .unwrap();
        // Different condition, same key.
        assert!(sm
            .add_transition("Idle", "Walk", "speed", Condition::LessThan, 1.0)
            .is_err());
        sm.add_transition("Idle", "Walk", "tired", Condition::LessThan, 1.0)
            .unwrap();
        assert!(sm.contains_transition("Idle", "Walk", "tired"));

        sm.transition_mut("Idle", "Walk", "speed").unwrap().threshold = 2.0;
        assert_eq!(sm.transition("Idle", "Walk", "speed").unwrap().threshold, 2.0);
    }

    #[test]
    fn conditions() {
        assert!(!Condition::None.evaluate(1.0, 0.0));
        assert!(Condition::Equal.evaluate(1.0, 1.0));
        assert!(Condition::NotEqual.evaluate(1.0, 0.0));
        assert!(Condition::LessThan.evaluate(-1.0, 0.0));
        assert!(Condition::LessOrEqual.evaluate(0.0, 0.0));
        assert!(Condition::GreaterThan.evaluate(0.05, 0.0));
        assert!(!Condition::GreaterThan.evaluate(0.0, 0.0));
        assert!(Condition::GreaterOrEqual.evaluate(0.0, 0.0));
    }
}
