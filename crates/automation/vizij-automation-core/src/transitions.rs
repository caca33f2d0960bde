//! One transition pass for a single stateful entity.

use crate::error::AutomationError;
use crate::ids::{EntityId, StateIndex};
use crate::state_machine::StateMachine;
use crate::stateful::Stateful;
use crate::Result;

/// Result of a pass: the state before it (`None` when it was unassigned) and after it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TransitionOutcome {
    pub previous: Option<StateIndex>,
    pub current: StateIndex,
    /// A transition fired (possibly a self-transition).
    pub fired: bool,
}

impl TransitionOutcome {
    /// State was assigned or fired this pass.
    #[inline]
    pub fn is_change(&self) -> bool {
        self.fired || self.previous.is_none()
    }
}

/// Resolve at most one state change for `stateful` against `machine`.
///
/// An unassigned state is first set to the machine's entry state; the scan then runs in
/// the same pass. The first transition leaving the current state whose condition holds
/// wins. `machine_entity` only labels errors.
pub fn evaluate_transitions(
    machine: &StateMachine,
    machine_entity: EntityId,
    stateful: &mut Stateful,
) -> Result<TransitionOutcome> {
    let previous = stateful.state;
    let state = match previous {
        Some(state) => state,
        None => {
            let entry = machine
                .entry_state()
                .ok_or(AutomationError::MissingEntryState {
                    machine: machine_entity,
                })?;
            stateful.state = Some(entry);
            entry
        }
    };

    let current_hash = machine
        .state_hash(state)
        .ok_or_else(|| AutomationError::UnknownState {
            name: format!("#{}", state.get()),
        })?;

    for transition in machine.transitions() {
        if transition.source_hash != current_hash {
            continue;
        }
        let value = stateful
            .parameter_by_hash(transition.parameter_hash)
            .ok_or_else(|| AutomationError::unknown_parameter_hash(transition.parameter_hash))?;
        if !transition.condition.evaluate(value, transition.threshold) {
            continue;
        }
        let destination = machine
            .find_state_by_hash(transition.dest_hash)
            .ok_or_else(|| AutomationError::unknown_state_hash(transition.dest_hash))?;
        stateful.state = Some(destination);
        return Ok(TransitionOutcome {
            previous,
            current: destination,
            fired: true,
        });
    }

    Ok(TransitionOutcome {
        previous,
        current: state,
        fired: false,
    })
}
