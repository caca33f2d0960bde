//! State → automation links.

use serde::{Deserialize, Serialize};

use crate::ids::{NameHash, RefId};
use crate::substrate::AutomationTarget;

/// Automation to play (and where to write it) while the owner is in a given state.
/// `automation_ref` indexes the owning entity's reference table.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateAutomationLink {
    pub state_name_hash: NameHash,
    pub target: AutomationTarget,
    pub automation_ref: RefId,
}

/// At most one link per state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSet {
    links: Vec<StateAutomationLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, or overwrite target and automation of the existing one for the same
    /// state. Returns the previous link if one was replaced.
    pub fn add_or_set(&mut self, link: StateAutomationLink) -> Option<StateAutomationLink> {
        match self
            .links
            .iter_mut()
            .find(|l| l.state_name_hash == link.state_name_hash)
        {
            Some(existing) => Some(std::mem::replace(existing, link)),
            None => {
                self.links.push(link);
                None
            }
        }
    }

    pub fn find(&self, state_name_hash: NameHash) -> Option<&StateAutomationLink> {
        self.links
            .iter()
            .find(|l| l.state_name_hash == state_name_hash)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateAutomationLink> {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_link_per_state() {
        let mut links = LinkSet::new();
        let target = AutomationTarget::component::<f32>(0, 4);
        let first = StateAutomationLink {
            state_name_hash: NameHash::of("Idle"),
            target,
            automation_ref: RefId::from_position(0),
        };
        assert!(links.add_or_set(first).is_none());

        let second = StateAutomationLink {
            automation_ref: RefId::from_position(3),
            ..first
        };
        assert_eq!(links.add_or_set(second), Some(first));
        assert_eq!(links.len(), 1);
        assert_eq!(
            links.find(NameHash::of("Idle")).map(|l| l.automation_ref),
            Some(RefId::from_position(3))
        );
        assert!(links.find(NameHash::of("Walk")).is_none());
    }
}
