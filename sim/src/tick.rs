//! The per-tick driver.
//!
//! One [`Simulation::tick`] call runs per display-refresh signal, on one
//! thread, with no suspension points inside. Fixed order: clamp dt, drain
//! the inbound queue, sample input, drive the seat machine, integrate and
//! resolve local physics, update the mount overlay, commit, throttled
//! outbound send, interpolate remotes. Callers then hand the committed
//! states to rendering and query LOD per remote entity.

use std::collections::HashSet;

use crate::collision::{ResolveParams, resolve_move};
use crate::config::SimConfig;
use crate::fault::SimFault;
use crate::input::{InputIntent, InputSampler};
use crate::lod::{self, LodDecision};
use crate::math::{Vec3, planar_distance_sq, yaw_from_xz};
use crate::mount::{MountSpec, MountState};
use crate::net::{InboundEvent, Transport};
use crate::physics::{StepParams, integrate};
use crate::remote::{RemoteId, RemoteRenderState};
use crate::resume::{DEFAULT_RESUME_MAX_AGE_MS, PersistedLocation};
use crate::room::{RoomGeometry, RoomHooks, SeatId};
use crate::seat::{SeatState, SeatTransition};
use crate::state::{ActiveRoom, LocalAvatarState, SimulationState};

/// What one tick observed. Faults are degradations already handled;
/// nothing here requires caller action.
#[derive(Debug, Default)]
pub struct TickReport {
    pub faults: Vec<SimFault>,
    /// Whether an outbound position send went out this tick.
    pub sent_update: bool,
}

/// The simulation core: configuration, aggregate state, input sampler.
pub struct Simulation {
    config: SimConfig,
    state: SimulationState,
    sampler: InputSampler,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: SimulationState::new(),
            sampler: InputSampler::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Device sources push input here between ticks.
    #[inline]
    pub fn sampler_mut(&mut self) -> &mut InputSampler {
        &mut self.sampler
    }

    /// Registered as the transport's inbound callback target. Events are
    /// queued here and consumed at the start of the next tick.
    #[inline]
    pub fn push_inbound(&mut self, event: InboundEvent) {
        self.state.inbox.push(event);
    }

    #[inline]
    pub fn local(&self) -> &LocalAvatarState {
        &self.state.local
    }

    #[inline]
    pub fn seat_state(&self) -> SeatState {
        self.state.seat.state()
    }

    /// Mount or swap the active mount. Takes effect next tick.
    pub fn set_mount(&mut self, spec: MountSpec) {
        self.state.local.mount = Some(MountState::new(spec));
    }

    pub fn clear_mount(&mut self) {
        self.state.local.mount = None;
    }

    /// Committed render states for every remote entity.
    pub fn remotes(&self) -> impl Iterator<Item = (RemoteId, &RemoteRenderState)> {
        self.state.remotes.iter_render()
    }

    /// Quality decision for one remote entity, from its rendered planar
    /// distance to the local avatar.
    pub fn lod_for(&self, id: RemoteId) -> Option<LodDecision> {
        let render = self.state.remotes.render_state(id)?;
        let dist_sq = planar_distance_sq(&self.state.local.position, &render.position);
        Some(lod::assess(&self.config.lod, dist_sq))
    }

    /// Activate a room: atomically discard the previous geometry and
    /// remote table and rebuild local state at the spawn (or at a fresh
    /// persisted resume hint for the same room).
    pub fn enter_room(
        &mut self,
        name: &str,
        geometry: RoomGeometry,
        hooks: Option<Box<dyn RoomHooks>>,
        spawn: Vec3,
        resume: Option<&PersistedLocation>,
        now_ms: i64,
    ) {
        let position = resume
            .and_then(|r| r.resume_position(name, now_ms, DEFAULT_RESUME_MAX_AGE_MS))
            .unwrap_or(spawn);

        log::info!("entering room '{name}' at {position:?}");

        let mount = self.state.local.mount.take();
        self.state.room = Some(ActiveRoom {
            name: name.to_owned(),
            geometry,
            hooks,
        });
        self.state.local = LocalAvatarState::at_spawn(position);
        self.state.local.mount = mount;
        self.state.seat.reset();
        self.state.remotes.clear();
        self.state.outbound.force_next();
    }

    /// Run one simulation tick.
    pub fn tick(&mut self, raw_dt_s: f32, transport: &mut dyn Transport) -> TickReport {
        let mut report = TickReport::default();
        let cfg = self.config;

        // 1) Clamp delta time (authoritative safety cap).
        let sane_dt = if raw_dt_s.is_finite() && raw_dt_s > 0.0 {
            raw_dt_s
        } else {
            0.0
        };
        let dt = sane_dt.min(cfg.physics.dt_cap_s);
        if sane_dt > cfg.physics.dt_cap_s {
            log::debug!("frame hitch: {sane_dt:.3}s clamped to {:.3}s", cfg.physics.dt_cap_s);
            report.faults.push(SimFault::FrameHitch { raw_dt: sane_dt });
        }
        self.state.clock_s += f64::from(dt);
        let now = self.state.clock_s;

        // 2) Consume inbound events queued since the last tick.
        for event in self.state.inbox.drain() {
            match event {
                InboundEvent::Snapshot { id, snapshot } => {
                    self.state.remotes.apply_snapshot(id, snapshot, now);
                }
                InboundEvent::EntityLeft { id } => self.state.remotes.remove(id),
                InboundEvent::Disconnected => {
                    log::warn!("transport disconnected; outbound sends paused");
                    self.state.connected = false;
                    report.faults.push(SimFault::NetworkDisconnect);
                }
                InboundEvent::Reconnected => {
                    log::info!("transport reconnected");
                    self.state.connected = true;
                    self.state.outbound.force_next();
                }
            }
        }

        // 3) Sample input once for the tick.
        let intent = self.sampler.sample();

        // 4) Seat machine (before physics; Seated overrides movement).
        let occupied: HashSet<SeatId> = self.state.remotes.occupied_seats().collect();
        let geometry = self.state.room.as_ref().map(|r| &r.geometry);
        let transition = self.state.seat.update(
            &cfg.seat,
            &cfg.physics,
            geometry,
            &occupied,
            &intent,
            &mut self.state.local,
        );
        if transition == SeatTransition::NoEligibleSeat {
            report.faults.push(SimFault::InvalidSeatTarget);
        }

        // 5) Physics + collision, suppressed entirely while seated.
        if self.state.seat.is_seated() {
            if let Some(mount) = &mut self.state.local.mount {
                mount.update(&cfg.mount, false, true, dt);
            }
        } else {
            self.step_standing(&intent, dt, &mut report);
        }

        // 6) Commit.
        self.state.local.last_intent = intent;

        // 7) Throttled outbound send.
        let aux = self
            .state
            .local
            .mount
            .is_some()
            .then_some(self.state.local.position);
        report.sent_update = self.state.outbound.maybe_send(
            &cfg.net,
            now,
            self.state.local.position,
            self.state.local.yaw,
            aux,
            self.state.connected,
            transport,
        );

        // 8) Smooth remote render states.
        self.state.remotes.interpolate_all(
            &cfg.interp,
            &cfg.net,
            dt,
            now,
            &mut report.faults,
        );

        report
    }

    /// Integrate and resolve one tick of standing (non-seated) motion.
    fn step_standing(&mut self, intent: &InputIntent, dt: f32, report: &mut TickReport) {
        let cfg = &self.config;
        let local = &mut self.state.local;

        // Mount overlay: speed/friction modifiers and jump gating.
        let (speed_mult, friction) = local
            .mount
            .as_ref()
            .map_or((1.0, 1.0), |m| (m.spec.speed_multiplier, m.spec.friction));
        let jump_allowed = local.mount.as_ref().map_or(true, |m| m.allows_jump());

        let mut jump = false;
        if intent.jump && jump_allowed {
            if local.grounded {
                jump = true;
            } else if let Some(mount) = &mut local.mount {
                // Airborne second jump: the mount trick, if capable.
                mount.try_start_trick(true);
            }
        }

        let step = integrate(
            &cfg.physics,
            StepParams {
                position: local.position,
                velocity: local.velocity,
                grounded: local.grounded,
                move_dir: intent.move_dir,
                jump,
                speed_multiplier: speed_mult,
                friction,
                dt_s: dt,
            },
        );
        local.velocity = step.velocity;

        match &self.state.room {
            Some(room) => {
                let resolved = resolve_move(
                    &cfg.physics,
                    &room.geometry,
                    room.hooks.as_deref(),
                    ResolveParams {
                        candidate: step.candidate,
                        vertical_velocity: step.velocity.y,
                    },
                );
                local.position = resolved.position;
                local.grounded = resolved.grounded;
                if resolved.grounded {
                    local.velocity.y = 0.0;
                }
            }
            None => {
                // Degraded mode: no geometry yet, collision skipped.
                log::debug!("no room geometry; collision skipped this tick");
                report.faults.push(SimFault::MissingGeometry);
                local.position = step.candidate;
                if step.jumped {
                    local.grounded = false;
                }
            }
        }

        // Facing follows planar intent.
        if let Some(yaw) = yaw_from_xz(intent.move_dir) {
            local.yaw = yaw;
        }

        // Mount sub-machine follows committed planar motion.
        let moving = local.velocity.x * local.velocity.x + local.velocity.z * local.velocity.z
            > 1.0e-4;
        if let Some(mount) = &mut local.mount {
            mount.update(&cfg.mount, moving, false, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::remote::RemoteSnapshot;
    use crate::room::{DismountSide, RoomBounds, SeatDescriptor};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct NullTransport {
        sends: usize,
    }

    impl Transport for NullTransport {
        fn send_position(&mut self, _p: Vec3, _y: f32, _aux: Option<Vec3>) {
            self.sends += 1;
        }
    }

    fn plaza() -> RoomGeometry {
        RoomGeometry {
            bounds: RoomBounds::Rect {
                min: Vec2::new(-20.0, -20.0),
                max: Vec2::new(20.0, 20.0),
            },
            floor_height: 0.0,
            colliders: vec![],
            landings: vec![],
            seats: vec![SeatDescriptor {
                id: 1,
                position: Vec3::new(10.0, 0.0, 10.0),
                yaw: 0.0,
                seat_height: 0.8,
                snap_offsets: vec![Vec2::zeros()],
                bidirectional: false,
                platform_height: None,
                dismount_side: DismountSide::Right,
            }],
        }
    }

    fn sim_in_plaza() -> Simulation {
        let mut sim = Simulation::new(SimConfig::default());
        sim.enter_room("plaza", plaza(), None, Vec3::zeros(), None, 0);
        sim
    }

    fn settle(sim: &mut Simulation, transport: &mut NullTransport) {
        for _ in 0..5 {
            sim.tick(DT, transport);
        }
    }

    #[test]
    fn at_rest_on_the_ground_vertical_velocity_is_zero() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);
        assert!(sim.local().grounded);

        let report = sim.tick(DT, &mut t);
        assert!(report.faults.is_empty());
        assert_eq!(sim.local().velocity.y, 0.0);
        assert_eq!(sim.local().position.y, 0.0);
    }

    #[test]
    fn jump_rises_and_lands_back_on_the_floor() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.sampler_mut().queue_jump();
        sim.tick(DT, &mut t);
        assert!(!sim.local().grounded);
        assert!(sim.local().velocity.y > 0.0);

        let mut peak: f32 = 0.0;
        for _ in 0..120 {
            sim.tick(DT, &mut t);
            peak = peak.max(sim.local().position.y);
            if sim.local().grounded {
                break;
            }
        }
        assert!(peak > 1.0, "peak = {peak}");
        assert!(sim.local().grounded);
        assert_eq!(sim.local().position.y, 0.0);
    }

    #[test]
    fn walking_respects_the_room_bounds() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.sampler_mut().set_move_axis(1.0, 0.0);
        for _ in 0..2_000 {
            sim.tick(DT, &mut t);
        }
        let max_x = 20.0 - sim.config().physics.avatar_radius_m;
        assert!((sim.local().position.x - max_x).abs() < 1.0e-3);
    }

    #[test]
    fn frame_hitch_is_clamped_and_reported() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.sampler_mut().set_move_axis(1.0, 0.0);
        let before = sim.local().position;
        let report = sim.tick(5.0, &mut t);
        assert!(report
            .faults
            .iter()
            .any(|f| matches!(f, SimFault::FrameHitch { .. })));
        // One stalled tick moves at most walk_speed * dt_cap.
        let moved = (sim.local().position - before).norm();
        let cap = sim.config().physics.walk_speed_mps * sim.config().physics.dt_cap_s;
        assert!(moved <= cap + 1.0e-4, "moved {moved}");
    }

    #[test]
    fn missing_geometry_degrades_without_failing() {
        let mut sim = Simulation::new(SimConfig::default());
        let mut t = NullTransport::default();
        let report = sim.tick(DT, &mut t);
        assert!(report.faults.contains(&SimFault::MissingGeometry));

        // Geometry arriving resolves the degradation.
        sim.enter_room("plaza", plaza(), None, Vec3::zeros(), None, 0);
        settle(&mut sim, &mut t);
        let report = sim.tick(DT, &mut t);
        assert!(!report.faults.contains(&SimFault::MissingGeometry));
    }

    #[test]
    fn seat_occupy_and_dismount_through_the_pipeline() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        sim.enter_room("plaza", plaza(), None, Vec3::new(10.5, 0.0, 10.0), None, 0);
        settle(&mut sim, &mut t);

        sim.sampler_mut().queue_interact();
        sim.tick(DT, &mut t);
        assert!(matches!(sim.seat_state(), SeatState::Seated { seat: 1, .. }));
        assert_eq!(sim.local().position, Vec3::new(10.0, 0.8, 10.0));
        assert_eq!(sim.local().velocity, Vec3::zeros());

        // Seated with no intent: nothing moves, gravity suppressed.
        sim.tick(DT, &mut t);
        assert_eq!(sim.local().position, Vec3::new(10.0, 0.8, 10.0));

        // Movement intent stands up.
        sim.sampler_mut().set_move_axis(0.0, 1.0);
        sim.tick(DT, &mut t);
        assert!(matches!(sim.seat_state(), SeatState::Standing));
        assert_eq!(sim.local().position.y, 0.0);
    }

    #[test]
    fn occupy_with_no_seat_in_range_reports_invalid_target() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.sampler_mut().queue_interact();
        let report = sim.tick(DT, &mut t);
        assert!(report.faults.contains(&SimFault::InvalidSeatTarget));
        assert!(matches!(sim.seat_state(), SeatState::Standing));
    }

    #[test]
    fn remote_seat_claims_block_local_occupancy() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        sim.enter_room("plaza", plaza(), None, Vec3::new(10.5, 0.0, 10.0), None, 0);
        settle(&mut sim, &mut t);

        sim.push_inbound(InboundEvent::Snapshot {
            id: 9,
            snapshot: RemoteSnapshot {
                position: Vec3::new(10.0, 0.8, 10.0),
                yaw: 0.0,
                seat: Some(1),
                mounted: false,
                received_at_s: 0.0,
            },
        });
        sim.sampler_mut().queue_interact();
        let report = sim.tick(DT, &mut t);
        assert!(report.faults.contains(&SimFault::InvalidSeatTarget));
        assert!(matches!(sim.seat_state(), SeatState::Standing));
    }

    #[test]
    fn mount_trick_happens_on_the_airborne_second_jump() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);
        sim.set_mount(MountSpec::board());

        sim.sampler_mut().queue_jump();
        sim.tick(DT, &mut t);
        assert!(!sim.local().grounded);
        assert!(!sim.local().mount.as_ref().unwrap().in_trick());

        sim.sampler_mut().queue_jump();
        sim.tick(DT, &mut t);
        assert!(sim.local().mount.as_ref().unwrap().in_trick());

        // A third jump mid-trick neither jumps nor restarts the trick.
        let y_vel = sim.local().velocity.y;
        sim.sampler_mut().queue_jump();
        sim.tick(DT, &mut t);
        assert!(sim.local().velocity.y < y_vel);
    }

    #[test]
    fn outbound_sends_are_dirty_gated_through_the_pipeline() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);
        let baseline = t.sends;

        // Standing still for a while: no further sends.
        for _ in 0..30 {
            sim.tick(DT, &mut t);
        }
        assert_eq!(t.sends, baseline);

        // Walking resumes sends, bounded by the minimum interval.
        sim.sampler_mut().set_move_axis(0.0, 1.0);
        for _ in 0..30 {
            sim.tick(DT, &mut t);
        }
        let walked = t.sends - baseline;
        assert!(walked >= 1);
        assert!(walked <= 11, "sends = {walked}");
    }

    #[test]
    fn disconnect_pauses_sends_until_reconnect() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.push_inbound(InboundEvent::Disconnected);
        let report = sim.tick(DT, &mut t);
        assert!(report.faults.contains(&SimFault::NetworkDisconnect));

        let baseline = t.sends;
        sim.sampler_mut().set_move_axis(1.0, 0.0);
        for _ in 0..30 {
            sim.tick(DT, &mut t);
        }
        assert_eq!(t.sends, baseline);

        sim.push_inbound(InboundEvent::Reconnected);
        for _ in 0..5 {
            sim.tick(DT, &mut t);
        }
        assert!(t.sends > baseline);
    }

    #[test]
    fn room_change_discards_remote_state_and_respawns() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        sim.push_inbound(InboundEvent::Snapshot {
            id: 2,
            snapshot: RemoteSnapshot {
                position: Vec3::new(1.0, 0.0, 1.0),
                yaw: 0.0,
                seat: None,
                mounted: false,
                received_at_s: 0.0,
            },
        });
        sim.tick(DT, &mut t);
        assert_eq!(sim.remotes().count(), 1);

        sim.enter_room("cafe", plaza(), None, Vec3::new(3.0, 0.0, 3.0), None, 0);
        assert_eq!(sim.remotes().count(), 0);
        assert_eq!(sim.local().position, Vec3::new(3.0, 0.0, 3.0));
        assert!(matches!(sim.seat_state(), SeatState::Standing));
    }

    #[test]
    fn resume_hint_overrides_spawn_for_the_same_room() {
        let mut sim = Simulation::new(SimConfig::default());
        let hint = PersistedLocation {
            x: 5.0,
            y: 0.0,
            z: -5.0,
            room: "plaza".into(),
            timestamp_ms: 1_000,
        };
        sim.enter_room("plaza", plaza(), None, Vec3::zeros(), Some(&hint), 2_000);
        assert_eq!(sim.local().position, Vec3::new(5.0, 0.0, -5.0));

        // A hint for another room is ignored.
        sim.enter_room("cafe", plaza(), None, Vec3::zeros(), Some(&hint), 2_000);
        assert_eq!(sim.local().position, Vec3::zeros());
    }

    #[test]
    fn remote_snapshots_flow_inbox_to_render_to_lod() {
        let mut sim = sim_in_plaza();
        let mut t = NullTransport::default();
        settle(&mut sim, &mut t);

        sim.push_inbound(InboundEvent::Snapshot {
            id: 5,
            snapshot: RemoteSnapshot {
                position: Vec3::new(3.0, 0.0, 4.0), // 5 m away
                yaw: 1.0,
                seat: None,
                mounted: false,
                received_at_s: 0.0,
            },
        });
        sim.tick(DT, &mut t);

        let (_, render) = sim.remotes().next().unwrap();
        assert_eq!(render.position, Vec3::new(3.0, 0.0, 4.0));

        let lod = sim.lod_for(5).unwrap();
        assert!(lod.full_rate && lod.nametag);
        assert!(sim.lod_for(99).is_none());
    }
}
