//! Mount overlay.
//!
//! A mount modifies ground speed and friction and carries a small trick
//! sub-machine: Idle -> Moving -> Trick(progress 0..1) -> Idle. Trick
//! state gates input (no third jump mid-trick) and drives a cosmetic
//! roll; it never participates in collision. Being seated suppresses the
//! movement-driven sub-states entirely.

use std::f32::consts::TAU;

use crate::config::MountConfig;

/// Static description of one mount type.
#[derive(Clone, Copy, Debug)]
pub struct MountSpec {
    /// Walk-speed multiplier.
    pub speed_multiplier: f32,
    /// Ground friction multiplier; sub-1.0 values slide (gradual
    /// deceleration without intent).
    pub friction: f32,
    /// Whether the rider's feet remain visible (cosmetic, for rendering).
    pub feet_visible: bool,
    /// Whether this mount can perform the airborne trick.
    pub can_trick: bool,
}

impl MountSpec {
    /// A board-style mount: fast, slippery, trick-capable.
    pub fn board() -> Self {
        Self {
            speed_multiplier: 1.6,
            friction: 0.9,
            feet_visible: false,
            can_trick: true,
        }
    }
}

/// Trick sub-state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrickState {
    Idle,
    Moving,
    /// Progress runs 0..1 at the configured rate.
    Trick { progress: f32 },
}

/// Runtime state of the active mount.
#[derive(Clone, Copy, Debug)]
pub struct MountState {
    pub spec: MountSpec,
    pub trick: TrickState,
    /// Cosmetic roll (radians) driven by trick progress; identity when
    /// not mid-trick.
    pub roll: f32,
}

impl MountState {
    pub fn new(spec: MountSpec) -> Self {
        Self {
            spec,
            trick: TrickState::Idle,
            roll: 0.0,
        }
    }

    #[inline]
    pub fn in_trick(&self) -> bool {
        matches!(self.trick, TrickState::Trick { .. })
    }

    /// Whether a jump input may be honored right now. A trick in flight
    /// blocks further jumps.
    #[inline]
    pub fn allows_jump(&self) -> bool {
        !self.in_trick()
    }

    /// Attempt to start the trick: requires being airborne, the trick
    /// capability, and not already mid-trick.
    pub fn try_start_trick(&mut self, airborne: bool) -> bool {
        if airborne && self.spec.can_trick && !self.in_trick() {
            self.trick = TrickState::Trick { progress: 0.0 };
            return true;
        }
        false
    }

    /// Advance the sub-machine one tick.
    ///
    /// `moving` is whether the avatar has meaningful planar motion;
    /// `seated` suppresses the movement-driven states.
    pub fn update(&mut self, cfg: &MountConfig, moving: bool, seated: bool, dt_s: f32) {
        if seated {
            self.trick = TrickState::Idle;
            self.roll = 0.0;
            return;
        }

        match self.trick {
            TrickState::Trick { progress } => {
                let next = progress + cfg.trick_rate_per_s * dt_s.max(0.0);
                if next >= 1.0 {
                    // Deterministic reset: rotation returns to identity.
                    self.trick = TrickState::Idle;
                    self.roll = 0.0;
                } else {
                    self.trick = TrickState::Trick { progress: next };
                    self.roll = next * TAU;
                }
            }
            TrickState::Idle | TrickState::Moving => {
                self.trick = if moving {
                    TrickState::Moving
                } else {
                    TrickState::Idle
                };
                self.roll = 0.0;
            }
        }
    }
}
