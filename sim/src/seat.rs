//! Seat state machine.
//!
//! Two states: Standing and Seated. Occupying snaps the avatar to the
//! nearest snap point of an eligible seat and zeroes velocity; while
//! seated, gravity and horizontal movement are suppressed by the tick
//! driver. Any movement intent (or a repeat interact) stands the avatar
//! back up, displaced to the seat's configured dismount side.

use std::collections::HashSet;

use crate::collision::resolve_ground_height;
use crate::config::{PhysicsConfig, SeatConfig};
use crate::input::InputIntent;
use crate::math::{Vec3, planar_distance_sq, right_from_yaw};
use crate::room::{RoomGeometry, SeatId};
use crate::state::LocalAvatarState;

/// Current seat state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatState {
    Standing,
    Seated { seat: SeatId, snap_point: usize },
}

/// What happened to the seat machine this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatTransition {
    None,
    Sat { seat: SeatId },
    Stood { seat: SeatId },
    /// An occupy action fired with no eligible seat in range.
    NoEligibleSeat,
}

#[derive(Debug)]
pub struct SeatController {
    state: SeatState,
}

impl SeatController {
    pub fn new() -> Self {
        Self {
            state: SeatState::Standing,
        }
    }

    #[inline]
    pub fn state(&self) -> SeatState {
        self.state
    }

    #[inline]
    pub fn is_seated(&self) -> bool {
        matches!(self.state, SeatState::Seated { .. })
    }

    /// The occupied seat, if any. At most one per avatar by construction.
    #[inline]
    pub fn seated_on(&self) -> Option<SeatId> {
        match self.state {
            SeatState::Seated { seat, .. } => Some(seat),
            SeatState::Standing => None,
        }
    }

    /// Reset to Standing (room change).
    pub fn reset(&mut self) {
        self.state = SeatState::Standing;
    }

    /// Drive the machine for one tick, before physics integration.
    ///
    /// While seated, movement intent or a repeat interact stands up; while
    /// standing, an interact attempts to occupy the nearest eligible seat.
    pub fn update(
        &mut self,
        seat_cfg: &SeatConfig,
        phys_cfg: &PhysicsConfig,
        geometry: Option<&RoomGeometry>,
        occupied: &HashSet<SeatId>,
        intent: &InputIntent,
        avatar: &mut LocalAvatarState,
    ) -> SeatTransition {
        match self.state {
            SeatState::Seated { .. } => {
                if intent.wants_move() || intent.interact {
                    self.stand(seat_cfg, phys_cfg, geometry, avatar)
                } else {
                    SeatTransition::None
                }
            }
            SeatState::Standing => {
                if intent.interact {
                    self.try_occupy(seat_cfg, geometry, occupied, avatar)
                } else {
                    SeatTransition::None
                }
            }
        }
    }

    /// Attempt to occupy the nearest eligible seat.
    ///
    /// Eligible: within the interaction radius and not occupied by anyone
    /// else. Occupying the seat we already sit on is a no-op.
    pub fn try_occupy(
        &mut self,
        cfg: &SeatConfig,
        geometry: Option<&RoomGeometry>,
        occupied: &HashSet<SeatId>,
        avatar: &mut LocalAvatarState,
    ) -> SeatTransition {
        let Some(geometry) = geometry else {
            return SeatTransition::NoEligibleSeat;
        };

        let radius_sq = cfg.interact_radius_m * cfg.interact_radius_m;
        let own_seat = self.seated_on();

        let mut best: Option<(&_, f32)> = None;
        for seat in &geometry.seats {
            if occupied.contains(&seat.id) && own_seat != Some(seat.id) {
                continue;
            }
            let d = planar_distance_sq(&seat.position, &avatar.position);
            if d > radius_sq {
                continue;
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((seat, d));
            }
        }

        let Some((seat, _)) = best else {
            log::debug!("occupy action with no eligible seat in range");
            return SeatTransition::NoEligibleSeat;
        };

        // Idempotent: already on this seat.
        if own_seat == Some(seat.id) {
            return SeatTransition::None;
        }

        let approach = avatar.position;
        let (snap_point, snap_world) = seat.nearest_snap_point(&approach);

        avatar.position = Vec3::new(
            snap_world.x,
            seat.position.y + seat.seat_height,
            snap_world.z,
        );
        avatar.velocity = Vec3::zeros();
        avatar.yaw = seat.facing_for_approach(&approach);
        avatar.grounded = true;

        self.state = SeatState::Seated {
            seat: seat.id,
            snap_point,
        };
        SeatTransition::Sat { seat: seat.id }
    }

    /// Stand up from the current seat, displaced to its dismount side.
    pub fn stand(
        &mut self,
        cfg: &SeatConfig,
        phys_cfg: &PhysicsConfig,
        geometry: Option<&RoomGeometry>,
        avatar: &mut LocalAvatarState,
    ) -> SeatTransition {
        let SeatState::Seated { seat: seat_id, .. } = self.state else {
            return SeatTransition::None;
        };
        self.state = SeatState::Standing;

        let Some(seat) = geometry.and_then(|g| g.seat(seat_id)) else {
            // Seat vanished with a room change mid-transition; just stand
            // in place and let gravity settle us.
            avatar.grounded = false;
            return SeatTransition::Stood { seat: seat_id };
        };

        let lateral = right_from_yaw(seat.yaw) * (cfg.dismount_offset_m * seat.dismount_side.sign());
        let x = avatar.position.x + lateral.x;
        let z = avatar.position.z + lateral.y;

        let y = match seat.platform_height {
            Some(h) => h,
            None => geometry.map_or(seat.position.y, |g| {
                resolve_ground_height(g, None, x, z, seat.position.y, 0.0, phys_cfg.ground_tolerance_m)
            }),
        };

        avatar.position = Vec3::new(x, y, z);
        avatar.velocity = Vec3::zeros();
        // Gravity resumes next tick.
        avatar.grounded = true;

        SeatTransition::Stood { seat: seat_id }
    }
}

impl Default for SeatController {
    fn default() -> Self {
        Self::new()
    }
}
