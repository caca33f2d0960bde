//! Per-entity state: current state, bound machine and float parameters.

use serde::{Deserialize, Serialize};

use crate::error::AutomationError;
use crate::ids::{NameHash, RefId, StateIndex};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub hash: NameHash,
    pub value: f32,
}

/// `state` stays `None` until the first transition pass (or a machine bind) resolves it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stateful {
    pub(crate) state: Option<StateIndex>,
    pub(crate) machine_ref: Option<RefId>,
    parameters: Vec<Parameter>,
}

impl Stateful {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> Option<StateIndex> {
        self.state
    }

    #[inline]
    pub fn machine_ref(&self) -> Option<RefId> {
        self.machine_ref
    }

    pub fn add_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        let hash = NameHash::of(name);
        if self.parameter_by_hash(hash).is_some() {
            return Err(AutomationError::DuplicateParameter {
                name: name.to_string(),
            });
        }
        self.parameters.push(Parameter {
            name: name.to_string(),
            hash,
            value,
        });
        Ok(())
    }

    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<()> {
        let hash = NameHash::of(name);
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.hash == hash)
            .ok_or_else(|| AutomationError::UnknownParameter {
                name: name.to_string(),
            })?;
        parameter.value = value;
        Ok(())
    }

    pub fn add_or_set_parameter(&mut self, name: &str, value: f32) {
        if self.set_parameter(name, value).is_err() {
            self.parameters.push(Parameter {
                name: name.to_string(),
                hash: NameHash::of(name),
                value,
            });
        }
    }

    pub fn parameter(&self, name: &str) -> Option<f32> {
        self.parameter_by_hash(NameHash::of(name))
    }

    pub fn parameter_by_hash(&self, hash: NameHash) -> Option<f32> {
        self.parameters
            .iter()
            .find(|p| p.hash == hash)
            .map(|p| p.value)
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}
