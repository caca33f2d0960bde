//! Per-entity playback state.

use serde::{Deserialize, Serialize};

use crate::ids::RefId;
use crate::substrate::AutomationTarget;

/// Plays one keyframe track into one target on its owning entity.
///
/// Created paused at time 0 with nothing bound. `track_ref` indexes the owning entity's
/// reference table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutomationPlayer {
    pub time: f64,
    paused: bool,
    track_ref: Option<RefId>,
    target: Option<AutomationTarget>,
}

impl Default for AutomationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationPlayer {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            paused: true,
            track_ref: None,
            target: None,
        }
    }

    #[inline]
    pub fn play(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn pause(&mut self) {
        self.paused = true;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn seek(&mut self, time: f64) {
        self.time = time.max(0.0);
    }

    #[inline]
    pub fn track_ref(&self) -> Option<RefId> {
        self.track_ref
    }

    #[inline]
    pub fn target(&self) -> Option<AutomationTarget> {
        self.target
    }

    /// Point at a new track/target and restart from 0.
    pub fn bind(&mut self, track_ref: RefId, target: AutomationTarget) {
        self.track_ref = Some(track_ref);
        self.target = Some(target);
        self.time = 0.0;
    }

    /// Both a track and a target are bound.
    pub fn binding(&self) -> Option<(RefId, AutomationTarget)> {
        Some((self.track_ref?, self.target?))
    }

    /// Advance by `dt` unless paused. Returns whether the player should write this tick.
    pub(crate) fn advance(&mut self, dt: f64) -> bool {
        if self.paused || self.binding().is_none() {
            return false;
        }
        self.time += dt;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_paused_and_unbound() {
        let mut player = AutomationPlayer::new();
        assert!(player.is_paused());
        assert!(player.binding().is_none());
        assert!(!player.advance(1.0));
        assert_eq!(player.time, 0.0);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut player = AutomationPlayer::new();
        player.bind(RefId::from_position(0), AutomationTarget::component::<f32>(0, 4));
        player.play();
        assert!(player.advance(0.5));
        player.pause();
        player.pause();
        assert!(!player.advance(0.5));
        assert_eq!(player.time, 0.5);
    }

    #[test]
    fn bind_resets_time() {
        let mut player = AutomationPlayer::new();
        player.seek(3.0);
        player.bind(RefId::from_position(1), AutomationTarget::component::<f32>(0, 4));
        assert_eq!(player.time, 0.0);
        player.seek(-1.0);
        assert_eq!(player.time, 0.0);
    }
}
