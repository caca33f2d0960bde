use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    automations: HashMap<String, String>,
    #[serde(rename = "state-machines")]
    state_machines: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Keyframe track definitions.
pub mod automations {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.automations.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.automations, "automation", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(&MANIFEST.automations, "automation", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.automations, "automation", name)?))
    }
}

/// State machine definitions.
pub mod state_machines {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.state_machines.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.state_machines, "state machine", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(&MANIFEST.state_machines, "state machine", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.state_machines, "state machine", name)?))
    }
}
