//! Core configuration for vizij-automation-core.

use serde::{Deserialize, Serialize};

/// Engine construction options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed the interpolation registry with the linear float/vec2/vec3/vec4 blends
    /// (method ids 1..=4). Disable only when the host registers its own table from id 1.
    pub register_builtins: bool,

    /// Maximum events retained per tick; further events are dropped.
    pub max_events_per_tick: usize,

    /// Capacity hint for the per-tick event buffer.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            register_builtins: true,
            max_events_per_tick: 1024,
            initial_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "max_events_per_tick": 8 }"#).unwrap();
        assert_eq!(cfg.max_events_per_tick, 8);
        assert!(cfg.register_builtins);
        assert_eq!(cfg.initial_capacity, Config::default().initial_capacity);
    }
}
