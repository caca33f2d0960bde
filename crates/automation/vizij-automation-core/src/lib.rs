//! Vizij Automation Core (engine-agnostic)
//!
//! Keyframe automations evaluated against byte regions of a host entity store, plus
//! parameter-driven state machines that pick which automation plays.
//!
//! Each [`Engine::update`] runs three passes in a fixed order:
//! transitions → state/automation links → playback.
//! The host ECS is reached only through the [`Substrate`] trait; [`World`] is a small
//! in-memory implementation used by tests and simple hosts.

pub mod bucket;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interp;
pub mod links;
pub mod outputs;
pub mod player;
pub mod sampling;
pub mod state_machine;
pub mod stateful;
pub mod stored;
pub mod substrate;
pub mod track;
pub mod transitions;
pub mod world;

// Re-exports for consumers (adapters)
pub use bucket::{bucket_size, ValueBucket};
pub use config::Config;
pub use engine::Engine;
pub use error::AutomationError;
pub use ids::{EntityId, MethodId, NameHash, RefId, StateIndex, TypeTag};
pub use interp::{InterpolationRegistry, Interpolator};
pub use links::{LinkSet, StateAutomationLink};
pub use outputs::{CoreEvent, Outputs, TickStage};
pub use player::AutomationPlayer;
pub use sampling::{evaluate_track, sample};
pub use state_machine::{Condition, StateMachine, Transition};
pub use stateful::{Parameter, Stateful};
pub use stored::{parse_state_machine_json, parse_track_json};
pub use substrate::{AutomationTarget, Region, Substrate};
pub use track::KeyframeTrack;
pub use transitions::{evaluate_transitions, TransitionOutcome};
pub use world::World;

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, AutomationError>;
