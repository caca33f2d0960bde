//! Engine: ownership of automation-side components and the per-tick pipeline.
//!
//! Methods:
//! - new, add_track / add_state_machine / add_stateful / add_player (component setup)
//! - set_state_machine, set_automation, add_or_set_link (bindings through the substrate)
//! - update: transitions → links → playback
//!
//! Components are keyed by the host [`EntityId`] they belong to and visited in ascending
//! entity order. References (machine, track, linked automation) live in the owning
//! entity's reference table inside the substrate.

use std::collections::BTreeMap;

use hashbrown::HashSet;

use crate::config::Config;
use crate::error::AutomationError;
use crate::ids::{EntityId, NameHash, StateIndex};
use crate::interp::InterpolationRegistry;
use crate::links::{LinkSet, StateAutomationLink};
use crate::outputs::{CoreEvent, Outputs, TickStage};
use crate::player::AutomationPlayer;
use crate::sampling::evaluate_track;
use crate::state_machine::StateMachine;
use crate::stateful::Stateful;
use crate::stored;
use crate::substrate::{AutomationTarget, Substrate};
use crate::track::KeyframeTrack;
use crate::transitions::evaluate_transitions;
use crate::Result;

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    interp: InterpolationRegistry,

    // Owned components
    tracks: BTreeMap<EntityId, KeyframeTrack>,
    machines: BTreeMap<EntityId, StateMachine>,
    statefuls: BTreeMap<EntityId, Stateful>,
    players: BTreeMap<EntityId, AutomationPlayer>,
    links: BTreeMap<EntityId, LinkSet>,

    // Per-tick outputs
    outputs: Outputs,
    // Entities that failed a pass this tick
    failed: HashSet<EntityId>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Machine bound to `stateful`, if any.
fn bound_machine<'m, S: Substrate + ?Sized>(
    machines: &'m BTreeMap<EntityId, StateMachine>,
    world: &S,
    entity: EntityId,
    stateful: &Stateful,
) -> Result<Option<(EntityId, &'m StateMachine)>> {
    let Some(reference) = stateful.machine_ref else {
        return Ok(None);
    };
    let machine_entity = world
        .resolve_reference(entity, reference)
        .ok_or(AutomationError::MissingReference { entity, reference })?;
    let machine = machines
        .get(&machine_entity)
        .ok_or_else(|| AutomationError::missing_component(machine_entity, "StateMachine"))?;
    Ok(Some((machine_entity, machine)))
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        let interp = if cfg.register_builtins {
            InterpolationRegistry::with_builtins()
        } else {
            InterpolationRegistry::new()
        };
        let outputs = Outputs::with_capacity(cfg.initial_capacity);
        Self {
            cfg,
            interp,
            tracks: BTreeMap::new(),
            machines: BTreeMap::new(),
            statefuls: BTreeMap::new(),
            players: BTreeMap::new(),
            links: BTreeMap::new(),
            outputs,
            failed: HashSet::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn registry(&self) -> &InterpolationRegistry {
        &self.interp
    }

    /// Setup-time access for registering custom interpolators.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut InterpolationRegistry {
        &mut self.interp
    }

    // ---------- tracks ----------

    /// Attach (or replace) the keyframe track owned by `entity`.
    pub fn add_track(&mut self, entity: EntityId, track: KeyframeTrack) {
        self.tracks.insert(entity, track);
    }

    pub fn track(&self, entity: EntityId) -> Option<&KeyframeTrack> {
        self.tracks.get(&entity)
    }

    /// Mutable access for appending keyframes.
    pub fn track_mut(&mut self, entity: EntityId) -> Option<&mut KeyframeTrack> {
        self.tracks.get_mut(&entity)
    }

    /// Parse a JSON track, resolving its interpolation name against this engine's registry.
    pub fn load_track_json(&mut self, entity: EntityId, json: &str) -> Result<()> {
        let track = stored::parse_track_json(json, &self.interp)?;
        self.add_track(entity, track);
        Ok(())
    }

    // ---------- state machines ----------

    pub fn add_state_machine(&mut self, entity: EntityId, machine: StateMachine) {
        self.machines.insert(entity, machine);
    }

    pub fn state_machine(&self, entity: EntityId) -> Option<&StateMachine> {
        self.machines.get(&entity)
    }

    pub fn state_machine_mut(&mut self, entity: EntityId) -> Option<&mut StateMachine> {
        self.machines.get_mut(&entity)
    }

    pub fn load_state_machine_json(&mut self, entity: EntityId, json: &str) -> Result<()> {
        let machine = stored::parse_state_machine_json(json)?;
        self.add_state_machine(entity, machine);
        Ok(())
    }

    // ---------- statefuls ----------

    /// Attach an empty stateful component (kept if one exists).
    pub fn add_stateful(&mut self, entity: EntityId) -> &mut Stateful {
        self.statefuls.entry(entity).or_default()
    }

    pub fn stateful(&self, entity: EntityId) -> Option<&Stateful> {
        self.statefuls.get(&entity)
    }

    pub fn stateful_mut(&mut self, entity: EntityId) -> Option<&mut Stateful> {
        self.statefuls.get_mut(&entity)
    }

    /// Set a parameter on a stateful entity (it must already exist).
    pub fn set_parameter(&mut self, entity: EntityId, name: &str, value: f32) -> Result<()> {
        self.statefuls
            .get_mut(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "Stateful"))?
            .set_parameter(name, value)
    }

    /// Bind `machine_entity` to the stateful component of `entity`.
    ///
    /// A first bind, or a rebind to a different machine, resets the state to the machine's
    /// entry state. Rebinding the machine already bound changes nothing.
    pub fn set_state_machine<S: Substrate + ?Sized>(
        &mut self,
        world: &mut S,
        entity: EntityId,
        machine_entity: EntityId,
    ) -> Result<()> {
        let entry = self
            .machines
            .get(&machine_entity)
            .ok_or_else(|| AutomationError::missing_component(machine_entity, "StateMachine"))?
            .entry_state();
        let stateful = self
            .statefuls
            .get_mut(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "Stateful"))?;

        match stateful.machine_ref {
            Some(reference) => {
                if world.resolve_reference(entity, reference) == Some(machine_entity) {
                    return Ok(());
                }
                world.set_reference(entity, reference, machine_entity)?;
            }
            None => {
                stateful.machine_ref = Some(world.add_reference(entity, machine_entity));
            }
        }
        stateful.state = entry;
        log::debug!(
            "automation: stateful {:?} bound to machine {:?}",
            entity,
            machine_entity
        );
        Ok(())
    }

    /// Machine entity bound to `entity`'s stateful component.
    pub fn bound_state_machine<S: Substrate + ?Sized>(
        &self,
        world: &S,
        entity: EntityId,
    ) -> Option<EntityId> {
        let reference = self.statefuls.get(&entity)?.machine_ref?;
        world.resolve_reference(entity, reference)
    }

    /// Current state of a stateful entity.
    pub fn current_state(&self, entity: EntityId) -> Result<StateIndex> {
        self.statefuls
            .get(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "Stateful"))?
            .state
            .ok_or(AutomationError::StateUnassigned { entity })
    }

    /// Name of the current state, looked up in the bound machine.
    pub fn current_state_name<S: Substrate + ?Sized>(
        &self,
        world: &S,
        entity: EntityId,
    ) -> Result<&str> {
        let state = self.current_state(entity)?;
        let stateful = self
            .statefuls
            .get(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "Stateful"))?;
        let (_, machine) = bound_machine(&self.machines, world, entity, stateful)?
            .ok_or_else(|| AutomationError::missing_component(entity, "StateMachine"))?;
        machine
            .state_name(state)
            .ok_or_else(|| AutomationError::UnknownState {
                name: format!("#{}", state.get()),
            })
    }

    // ---------- players ----------

    /// Attach a player (created paused and unbound; kept if one exists).
    pub fn add_player(&mut self, entity: EntityId) -> &mut AutomationPlayer {
        self.players.entry(entity).or_default()
    }

    pub fn player(&self, entity: EntityId) -> Option<&AutomationPlayer> {
        self.players.get(&entity)
    }

    pub fn player_mut(&mut self, entity: EntityId) -> Option<&mut AutomationPlayer> {
        self.players.get_mut(&entity)
    }

    /// Point `entity`'s player at `track_entity`, writing into `target`. Resets time to 0.
    pub fn set_automation<S: Substrate + ?Sized>(
        &mut self,
        world: &mut S,
        entity: EntityId,
        track_entity: EntityId,
        target: AutomationTarget,
    ) -> Result<()> {
        let player = self
            .players
            .get_mut(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "AutomationPlayer"))?;
        let reference = match player.track_ref() {
            Some(reference) => {
                world.set_reference(entity, reference, track_entity)?;
                reference
            }
            None => world.add_reference(entity, track_entity),
        };
        player.bind(reference, target);
        Ok(())
    }

    /// Track entity the player of `entity` currently plays.
    pub fn current_automation<S: Substrate + ?Sized>(
        &self,
        world: &S,
        entity: EntityId,
    ) -> Option<EntityId> {
        let reference = self.players.get(&entity)?.track_ref()?;
        world.resolve_reference(entity, reference)
    }

    // ---------- links ----------

    /// Link `state_name` of `entity`'s bound machine to `automation_entity`.
    ///
    /// The state must exist in the bound machine. An existing link for the same state is
    /// overwritten (target and automation).
    pub fn add_or_set_link<S: Substrate + ?Sized>(
        &mut self,
        world: &mut S,
        entity: EntityId,
        state_name: &str,
        automation_entity: EntityId,
        target: AutomationTarget,
    ) -> Result<()> {
        let stateful = self
            .statefuls
            .get(&entity)
            .ok_or_else(|| AutomationError::missing_component(entity, "Stateful"))?;
        let (_, machine) = bound_machine(&self.machines, &*world, entity, stateful)?
            .ok_or_else(|| AutomationError::missing_component(entity, "StateMachine"))?;
        if !machine.contains_state(state_name) {
            return Err(AutomationError::UnknownState {
                name: state_name.to_string(),
            });
        }

        let state_name_hash = NameHash::of(state_name);
        let links = self.links.entry(entity).or_default();
        let automation_ref = match links.find(state_name_hash) {
            Some(existing) => {
                world.set_reference(entity, existing.automation_ref, automation_entity)?;
                existing.automation_ref
            }
            None => world.add_reference(entity, automation_entity),
        };
        links.add_or_set(StateAutomationLink {
            state_name_hash,
            target,
            automation_ref,
        });
        Ok(())
    }

    pub fn links(&self, entity: EntityId) -> Option<&LinkSet> {
        self.links.get(&entity)
    }

    // ---------- tick ----------

    /// Step all passes by `dt` seconds and return this tick's events.
    ///
    /// A failing entity is reported as [`CoreEvent::EntityFailed`] and skipped by every later
    /// pass of the tick; other entities keep evaluating.
    pub fn update<S: Substrate + ?Sized>(&mut self, world: &mut S, dt: f64) -> &Outputs {
        self.outputs.clear();
        self.failed.clear();
        self.run_transitions(&*world);
        self.run_links(world);
        self.run_playback(world, dt);
        &self.outputs
    }

    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    fn report_failure(&mut self, entity: EntityId, stage: TickStage, error: AutomationError) {
        self.failed.insert(entity);
        log::error!(
            "automation: {:?} pass failed for entity {:?} ({}): {}",
            stage,
            entity,
            error.category(),
            error
        );
        let limit = self.cfg.max_events_per_tick;
        self.outputs.push_event(
            CoreEvent::EntityFailed {
                entity,
                stage,
                error,
            },
            limit,
        );
    }

    fn run_transitions<S: Substrate + ?Sized>(&mut self, world: &S) {
        let mut failures = Vec::new();
        let limit = self.cfg.max_events_per_tick;

        for (&entity, stateful) in self.statefuls.iter_mut() {
            let result = bound_machine(&self.machines, world, entity, stateful).and_then(
                |machine| match machine {
                    Some((machine_entity, machine)) => {
                        evaluate_transitions(machine, machine_entity, stateful).map(Some)
                    }
                    None => Ok(None),
                },
            );
            match result {
                Ok(Some(outcome)) if outcome.is_change() => {
                    log::debug!(
                        "automation: entity {:?} state {:?} -> {}",
                        entity,
                        outcome.previous.map(StateIndex::get),
                        outcome.current.get()
                    );
                    self.outputs.push_event(
                        CoreEvent::StateChanged {
                            entity,
                            from: outcome.previous,
                            to: outcome.current,
                        },
                        limit,
                    );
                }
                Ok(_) => {}
                Err(error) => failures.push((entity, error)),
            }
        }

        for (entity, error) in failures {
            self.report_failure(entity, TickStage::Transitions, error);
        }
    }

    fn run_links<S: Substrate + ?Sized>(&mut self, world: &mut S) {
        let mut failures = Vec::new();
        let limit = self.cfg.max_events_per_tick;

        for (&entity, links) in self.links.iter() {
            if self.failed.contains(&entity) {
                continue;
            }
            let (Some(stateful), Some(player)) =
                (self.statefuls.get(&entity), self.players.get_mut(&entity))
            else {
                continue;
            };
            match Self::apply_link(&self.machines, world, entity, stateful, player, links) {
                Ok(Some(automation)) => {
                    log::debug!(
                        "automation: entity {:?} now plays automation {:?}",
                        entity,
                        automation
                    );
                    self.outputs.push_event(
                        CoreEvent::AutomationBound { entity, automation },
                        limit,
                    );
                }
                Ok(None) => {}
                Err(error) => failures.push((entity, error)),
            }
        }

        for (entity, error) in failures {
            self.report_failure(entity, TickStage::Links, error);
        }
    }

    /// Rebind `player` to the link of the current state. Returns the newly bound
    /// automation, or `None` when nothing changed.
    fn apply_link<S: Substrate + ?Sized>(
        machines: &BTreeMap<EntityId, StateMachine>,
        world: &mut S,
        entity: EntityId,
        stateful: &Stateful,
        player: &mut AutomationPlayer,
        links: &LinkSet,
    ) -> Result<Option<EntityId>> {
        // State not resolved yet.
        let Some(state) = stateful.state else {
            return Ok(None);
        };
        let Some((_, machine)) = bound_machine(machines, &*world, entity, stateful)? else {
            return Ok(None);
        };
        let state_hash = machine
            .state_hash(state)
            .ok_or_else(|| AutomationError::UnknownState {
                name: format!("#{}", state.get()),
            })?;
        let Some(link) = links.find(state_hash) else {
            return Ok(None);
        };

        let desired = world
            .resolve_reference(entity, link.automation_ref)
            .ok_or(AutomationError::MissingReference {
                entity,
                reference: link.automation_ref,
            })?;

        let reference = match player.track_ref() {
            None => world.add_reference(entity, desired),
            Some(reference) => {
                if world.resolve_reference(entity, reference) == Some(desired) {
                    return Ok(None);
                }
                world.set_reference(entity, reference, desired)?;
                reference
            }
        };
        player.bind(reference, link.target);
        Ok(Some(desired))
    }

    fn run_playback<S: Substrate + ?Sized>(&mut self, world: &mut S, dt: f64) {
        let mut failures = Vec::new();

        for (&entity, player) in self.players.iter_mut() {
            if self.failed.contains(&entity) || !player.advance(dt) {
                continue;
            }
            let result = Self::play_one(&self.tracks, &self.interp, world, entity, player);
            if let Err(error) = result {
                failures.push((entity, error));
            }
        }

        for (entity, error) in failures {
            self.report_failure(entity, TickStage::Playback, error);
        }
    }

    fn play_one<S: Substrate + ?Sized>(
        tracks: &BTreeMap<EntityId, KeyframeTrack>,
        interp: &InterpolationRegistry,
        world: &mut S,
        entity: EntityId,
        player: &AutomationPlayer,
    ) -> Result<()> {
        let Some((reference, target)) = player.binding() else {
            return Ok(());
        };
        let track_entity = world
            .resolve_reference(entity, reference)
            .ok_or(AutomationError::MissingReference { entity, reference })?;
        let track = tracks
            .get(&track_entity)
            .ok_or_else(|| AutomationError::missing_component(track_entity, "KeyframeTrack"))?;
        let out = world.target_bytes_mut(entity, &target)?;
        evaluate_track(track, player.time as f32, interp, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn empty_engine_ticks_cleanly() {
        let mut engine = Engine::default();
        let mut world = World::new();
        assert!(engine.update(&mut world, 0.016).is_empty());
        assert_eq!(engine.registry().len(), 4);
    }

    #[test]
    fn registry_can_start_empty() {
        let engine = Engine::new(Config {
            register_builtins: false,
            ..Config::default()
        });
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn current_state_requires_assignment() {
        let mut engine = Engine::default();
        let e = EntityId(1);
        engine.add_stateful(e);
        assert_eq!(
            engine.current_state(e),
            Err(AutomationError::StateUnassigned { entity: e })
        );
    }
}
