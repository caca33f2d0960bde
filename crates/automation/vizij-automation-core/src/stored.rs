//! JSON loaders for state machine and keyframe track definitions.

use serde::Deserialize;

use crate::error::AutomationError;
use crate::interp::InterpolationRegistry;
use crate::state_machine::{Condition, StateMachine};
use crate::track::KeyframeTrack;
use crate::Result;

/// Parse a JSON state machine definition.
///
/// Notes:
/// - `states` are added in order; duplicates fail with `DuplicateState`.
/// - `entry` is optional and must name a declared state.
/// - `condition` uses camelCase names (`greaterThan`, `lessOrEqual`, ...) and defaults to
///   `none`; `threshold` defaults to 0.
pub fn parse_state_machine_json(s: &str) -> Result<StateMachine> {
    let stored: StoredStateMachine = serde_json::from_str(s)?;

    let mut machine = StateMachine::new();
    for state in &stored.states {
        machine.add_state(state)?;
    }
    if let Some(entry) = &stored.entry {
        machine.set_entry_state(entry)?;
    }
    for t in &stored.transitions {
        machine.add_transition(&t.from, &t.to, &t.parameter, t.condition, t.threshold)?;
    }
    Ok(machine)
}

/// Parse a JSON keyframe track.
///
/// Values are a number (f32) or an array of 2..=4 numbers (`[f32; N]`); every keyframe must
/// use the same shape. `interpolation` names a method registered in `registry`; omitted
/// means hold.
pub fn parse_track_json(s: &str, registry: &InterpolationRegistry) -> Result<KeyframeTrack> {
    let stored: StoredTrack = serde_json::from_str(s)?;

    let mut track = KeyframeTrack::new(stored.looping);
    if let Some(name) = &stored.interpolation {
        let method = registry
            .method_by_name(name)
            .ok_or_else(|| AutomationError::Serialization {
                reason: format!("unknown interpolation `{name}`"),
            })?;
        track = track.with_interpolation(method);
    }

    for keyframe in &stored.keyframes {
        let time = keyframe.time as f32;
        match &keyframe.value {
            RawValue::Number(n) => track.push(time, *n as f32)?,
            RawValue::Vector(v) => match v.as_slice() {
                [x, y] => track.push(time, [*x as f32, *y as f32])?,
                [x, y, z] => track.push(time, [*x as f32, *y as f32, *z as f32])?,
                [x, y, z, w] => track.push(time, [*x as f32, *y as f32, *z as f32, *w as f32])?,
                other => {
                    return Err(AutomationError::Serialization {
                        reason: format!(
                            "keyframe at {time}: vector values need 2..=4 components, got {}",
                            other.len()
                        ),
                    })
                }
            },
        }
    }
    Ok(track)
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredStateMachine {
    pub states: Vec<String>,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub transitions: Vec<StoredTransition>,
}

#[derive(Debug, Deserialize)]
struct StoredTransition {
    pub from: String,
    pub to: String,
    pub parameter: String,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub threshold: f32,
}

#[derive(Debug, Deserialize)]
struct StoredTrack {
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub interpolation: Option<String>,
    #[serde(default)]
    pub keyframes: Vec<StoredKeyframe>,
}

#[derive(Debug, Deserialize)]
struct StoredKeyframe {
    pub time: f64,
    pub value: RawValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Vector(Vec<f64>),
}
