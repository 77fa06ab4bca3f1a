/*!
Simulation configuration.

One immutable [`SimConfig`] is built at startup and passed by reference to
the components that need it. There are no global mutable capability flags;
platform/tuning differences are expressed here once.

Notes
- Distances are in meters, time in seconds, angles in radians.
- Favor practical world-space tolerances over machine epsilon.
- The delta-time safety cap is the authoritative guard against frame
  hitches: the tick driver clamps dt once, before any component reads it.
  `max_fall_per_tick_m` remains as an independent backstop inside the
  integrator so a misconfigured cap still cannot teleport the avatar
  downward in a single tick.
*/

/// Local-avatar physics tuning.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsConfig {
    /// Gravity magnitude (m/s^2, positive value, applied downward).
    pub gravity_mps2: f32,
    /// Terminal fall speed magnitude (m/s). Vertical velocity is clamped
    /// to `[-terminal, terminal]` after every integration step.
    pub terminal_fall_mps: f32,
    /// Upward velocity set by a jump (m/s).
    pub jump_impulse_mps: f32,
    /// Ground walk speed (m/s) before mount multipliers.
    pub walk_speed_mps: f32,
    /// Airborne horizontal drag factor per reference tick (unitless, 0..1).
    /// Re-applied per current-tick dt so frame hitches do not distort
    /// air strafing.
    pub air_drag_per_tick: f32,
    /// Reference tick rate the drag/friction factors are expressed at (Hz).
    pub reference_tick_hz: f32,
    /// Delta-time safety cap (seconds). A stalled tab produces one huge dt;
    /// it is clamped to this before integration.
    pub dt_cap_s: f32,
    /// Maximum downward displacement per tick (meters). Backstop, see
    /// module docs.
    pub max_fall_per_tick_m: f32,
    /// Avatar collision radius (meters).
    pub avatar_radius_m: f32,
    /// Avatar collision height, feet to head (meters).
    pub avatar_height_m: f32,
    /// Tolerance for treating the avatar as standing on a surface (meters).
    pub ground_tolerance_m: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_mps2: 30.0,
            terminal_fall_mps: 50.0,
            jump_impulse_mps: 12.0,
            walk_speed_mps: 4.0,
            air_drag_per_tick: 0.96,
            reference_tick_hz: 60.0,
            dt_cap_s: 0.1,
            max_fall_per_tick_m: 5.0,
            avatar_radius_m: 0.4,
            avatar_height_m: 1.7,
            ground_tolerance_m: 0.05,
        }
    }
}

/// Outbound send throttling and inbound staleness.
#[derive(Clone, Copy, Debug)]
pub struct NetConfig {
    /// Minimum interval between outbound position sends (seconds).
    pub min_send_interval_s: f32,
    /// Planar movement (squared meters) required to consider the local
    /// transform dirty for sending.
    pub position_dirty_sq_m2: f32,
    /// Yaw change (radians) required to consider the transform dirty.
    pub yaw_dirty_rad: f32,
    /// After this long without a fresh snapshot an entity is reported
    /// stale (seconds). Its last target is held either way.
    pub snapshot_stale_after_s: f32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            min_send_interval_s: 0.05,
            position_dirty_sq_m2: 0.01,
            yaw_dirty_rad: 0.05,
            snapshot_stale_after_s: 1.0,
        }
    }
}

/// Remote-avatar render smoothing rates (1/seconds).
///
/// Used as `alpha = 1 - exp(-rate * dt)` so convergence speed does not
/// depend on the client's frame rate.
#[derive(Clone, Copy, Debug)]
pub struct InterpConfig {
    pub position_rate: f32,
    pub yaw_rate: f32,
}

impl Default for InterpConfig {
    fn default() -> Self {
        Self {
            position_rate: 12.0,
            yaw_rate: 24.0,
        }
    }
}

/// Squared-distance thresholds for per-entity quality gating (m^2).
///
/// Each gate is independent and monotone: an entity strictly closer than
/// the threshold gets the feature, at or beyond it does not (ties resolve
/// to the cheaper side).
#[derive(Clone, Copy, Debug)]
pub struct LodConfig {
    /// Full-rate update eligibility.
    pub full_rate_dist_sq: f32,
    /// Shadow casting.
    pub shadow_dist_sq: f32,
    /// Cosmetic / particle animation.
    pub particle_dist_sq: f32,
    /// Nametag visibility.
    pub nametag_dist_sq: f32,
    /// Companion pet visibility.
    pub pet_dist_sq: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            full_rate_dist_sq: 400.0,   // 20 m
            shadow_dist_sq: 625.0,      // 25 m
            particle_dist_sq: 900.0,    // 30 m
            nametag_dist_sq: 1_225.0,   // 35 m
            pet_dist_sq: 400.0,         // 20 m
        }
    }
}

/// Seat interaction tuning.
#[derive(Clone, Copy, Debug)]
pub struct SeatConfig {
    /// Maximum planar distance at which a seat can be occupied (meters).
    pub interact_radius_m: f32,
    /// Lateral displacement applied when standing up (meters).
    pub dismount_offset_m: f32,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            interact_radius_m: 1.5,
            dismount_offset_m: 0.6,
        }
    }
}

/// Mount trick tuning.
#[derive(Clone, Copy, Debug)]
pub struct MountConfig {
    /// Trick progress advanced per second (a full trick at 2.0 takes 0.5 s).
    pub trick_rate_per_s: f32,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            trick_rate_per_s: 2.0,
        }
    }
}

/// The complete, immutable simulation configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub net: NetConfig,
    pub interp: InterpConfig,
    pub lod: LodConfig,
    pub seat: SeatConfig,
    pub mount: MountConfig,
}
