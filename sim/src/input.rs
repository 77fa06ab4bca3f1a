//! Input sampling.
//!
//! Device sources (keyboard, gamepad, touch) push state between ticks; the
//! tick driver polls [`InputSampler::sample`] exactly once per tick. This
//! decouples input timing from simulation timing: however many device
//! events fire between two ticks, the simulation sees one intent.

use crate::math::Vec2;

/// One normalized per-tick movement/action intent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputIntent {
    /// Planar movement direction (XZ), length clamped to `<= 1`.
    pub move_dir: Vec2,
    /// Jump requested this tick (edge-triggered).
    pub jump: bool,
    /// Interact (seat occupy) requested this tick (edge-triggered).
    pub interact: bool,
}

impl InputIntent {
    /// True if the intent carries meaningful planar movement.
    #[inline]
    pub fn wants_move(&self) -> bool {
        self.move_dir.norm_squared() > 1.0e-6
    }
}

/// Accumulates device state between ticks.
///
/// The movement axis is held state (set each time a device reports it);
/// jump/interact are edges, latched until the next `sample()`.
#[derive(Debug, Default)]
pub struct InputSampler {
    move_axis: Vec2,
    jump_queued: bool,
    interact_queued: bool,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the held movement axis. Out-of-range values are clamped to
    /// the unit disc, never rejected.
    pub fn set_move_axis(&mut self, x: f32, z: f32) {
        let x = if x.is_finite() { x } else { 0.0 };
        let z = if z.is_finite() { z } else { 0.0 };
        self.move_axis = Vec2::new(x, z);
    }

    /// Latch a jump press until the next sample.
    pub fn queue_jump(&mut self) {
        self.jump_queued = true;
    }

    /// Latch an interact press until the next sample.
    pub fn queue_interact(&mut self) {
        self.interact_queued = true;
    }

    /// Poll the intent for this tick, clearing edge-triggered flags.
    /// The held movement axis persists across samples.
    pub fn sample(&mut self) -> InputIntent {
        let mut dir = self.move_axis;
        let len_sq = dir.norm_squared();
        if len_sq > 1.0 {
            dir /= len_sq.sqrt();
        }

        let intent = InputIntent {
            move_dir: dir,
            jump: self.jump_queued,
            interact: self.interact_queued,
        };

        self.jump_queued = false;
        self.interact_queued = false;
        intent
    }
}
