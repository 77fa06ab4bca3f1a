//! Local avatar state and the per-room simulation aggregate.
//!
//! All mutable simulation state lives in one aggregate owned by the tick
//! driver and passed by reference into component functions. There are no
//! scattered mutable cells and no hidden cross-component coupling.

use crate::input::InputIntent;
use crate::math::Vec3;
use crate::mount::MountState;
use crate::net::{OutboundThrottle, SnapshotInbox};
use crate::remote::RemoteTable;
use crate::room::{RoomGeometry, RoomHooks};
use crate::seat::SeatController;

/// The local avatar, exclusively owned and mutated by the tick pipeline.
/// Created on room entry, reset on room change.
#[derive(Debug)]
pub struct LocalAvatarState {
    /// World position of the avatar's feet.
    pub position: Vec3,
    /// Velocity (m/s).
    pub velocity: Vec3,
    /// Facing yaw (radians).
    pub yaw: f32,
    /// Ground support at the end of the last tick.
    pub grounded: bool,
    /// Active mount overlay, if any.
    pub mount: Option<MountState>,
    /// The intent committed last tick.
    pub last_intent: InputIntent,
}

impl LocalAvatarState {
    pub fn at_spawn(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::zeros(),
            yaw: 0.0,
            grounded: false,
            mount: None,
            last_intent: InputIntent::default(),
        }
    }
}

/// The active room: geometry published by the room-load collaborator plus
/// its optional physics hooks.
pub struct ActiveRoom {
    pub name: String,
    pub geometry: RoomGeometry,
    pub hooks: Option<Box<dyn RoomHooks>>,
}

impl std::fmt::Debug for ActiveRoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRoom")
            .field("name", &self.name)
            .field("seats", &self.geometry.seats.len())
            .field("has_hooks", &self.hooks.is_some())
            .finish()
    }
}

/// Everything the tick driver mutates, in one place.
#[derive(Debug)]
pub struct SimulationState {
    /// Absent until the room-load collaborator publishes geometry;
    /// collision degrades to pass-through meanwhile.
    pub room: Option<ActiveRoom>,
    pub local: LocalAvatarState,
    pub seat: SeatController,
    pub remotes: RemoteTable,
    pub outbound: OutboundThrottle,
    pub inbox: SnapshotInbox,
    /// Transport connectivity; outbound sends pause while false.
    pub connected: bool,
    /// Simulation clock (seconds since creation), advanced by clamped dt.
    pub clock_s: f64,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            room: None,
            local: LocalAvatarState::at_spawn(Vec3::zeros()),
            seat: SeatController::new(),
            remotes: RemoteTable::new(),
            outbound: OutboundThrottle::new(),
            inbox: SnapshotInbox::new(),
            connected: true,
            clock_s: 0.0,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}
