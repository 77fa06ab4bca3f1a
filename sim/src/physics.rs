//! Local-avatar physics integration.
//!
//! One integration step per tick: gravity, jump impulse, horizontal
//! velocity from intent (ground) or drag (air), producing a candidate
//! position for the collision resolver. The integrator never fails;
//! out-of-range inputs are clamped, not rejected.

use crate::config::PhysicsConfig;
use crate::math::{Vec2, Vec3};

/// Parameters for one integration step.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    /// Current world position (capsule feet).
    pub position: Vec3,
    /// Current velocity (m/s).
    pub velocity: Vec3,
    /// Whether the avatar had ground support at the start of the tick.
    pub grounded: bool,
    /// Planar movement intent. Non-finite components are zeroed and the
    /// norm is clamped to 1 before use.
    pub move_dir: Vec2,
    /// Jump requested this tick.
    pub jump: bool,
    /// Walk-speed multiplier from the active mount (1.0 when unmounted).
    pub speed_multiplier: f32,
    /// Ground friction multiplier from the active mount (1.0 = instant
    /// stop when intent is absent; sub-1.0 = gradual slide).
    pub friction: f32,
    /// Delta time (seconds). The tick driver clamps this to the safety
    /// cap before calling; the integrator clamps again as a backstop.
    pub dt_s: f32,
}

/// Result of one integration step.
#[derive(Clone, Copy, Debug)]
pub struct StepResult {
    /// Candidate position for the collision resolver.
    pub candidate: Vec3,
    /// Updated velocity.
    pub velocity: Vec3,
    /// Whether a jump impulse was applied this step (clears grounded).
    pub jumped: bool,
}

/// Integrate one tick of local-avatar motion.
///
/// Semantics:
/// - Gravity accumulates every tick (`v.y -= g*dt`), clamped to terminal.
/// - On the ground, horizontal velocity is set directly from intent
///   (arcade feel, not momentum); without intent, friction below 1.0
///   decays it gradually, 1.0 stops instantly.
/// - Airborne, horizontal velocity keeps its direction and decays by the
///   fixed drag factor re-applied per the *current* tick's dt, so a frame
///   hitch does not distort air strafing.
/// - A jump sets vertical velocity to the configured impulse.
/// - Downward displacement per tick is clamped to `max_fall_per_tick_m`
///   as a backstop behind the dt cap.
pub fn integrate(cfg: &PhysicsConfig, p: StepParams) -> StepResult {
    // Backstop clamps; the tick driver applies the authoritative dt cap.
    let dt = p.dt_s.clamp(0.0, cfg.dt_cap_s);
    let speed_mult = if p.speed_multiplier.is_finite() {
        p.speed_multiplier.max(0.0)
    } else {
        1.0
    };
    let friction = if p.friction.is_finite() {
        p.friction.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let move_dir = {
        let x = if p.move_dir.x.is_finite() { p.move_dir.x } else { 0.0 };
        let z = if p.move_dir.y.is_finite() { p.move_dir.y } else { 0.0 };
        let d = Vec2::new(x, z);
        let n2 = d.norm_squared();
        if n2 > 1.0 { d / n2.sqrt() } else { d }
    };

    let mut vel = p.velocity;
    let mut jumped = false;

    // 1) Jump impulse, only with ground support.
    if p.jump && p.grounded {
        vel.y = cfg.jump_impulse_mps;
        jumped = true;
    } else {
        // 2) Gravity (semi-implicit Euler).
        vel.y -= cfg.gravity_mps2 * dt;
    }

    // 3) Terminal clamp, both directions.
    vel.y = vel.y.clamp(-cfg.terminal_fall_mps, cfg.terminal_fall_mps);

    // 4) Horizontal velocity.
    let airborne = !p.grounded || jumped;
    if airborne {
        // Keep direction; frame-rate-independent drag.
        let decay = cfg.air_drag_per_tick.powf(dt * cfg.reference_tick_hz);
        vel.x *= decay;
        vel.z *= decay;
    } else if move_dir.norm_squared() > 1.0e-6 {
        let planar = move_dir * (cfg.walk_speed_mps * speed_mult);
        vel.x = planar.x;
        vel.z = planar.y;
    } else if friction < 1.0 {
        // Slippery mount surface: gradual deceleration.
        let decay = friction.powf(dt * cfg.reference_tick_hz);
        vel.x *= decay;
        vel.z *= decay;
    } else {
        vel.x = 0.0;
        vel.z = 0.0;
    }

    // 5) Displacement; downward motion clamped by the per-tick backstop.
    let mut dy = vel.y * dt;
    if dy < -cfg.max_fall_per_tick_m {
        dy = -cfg.max_fall_per_tick_m;
    }

    let candidate = Vec3::new(
        p.position.x + vel.x * dt,
        p.position.y + dy,
        p.position.z + vel.z * dt,
    );

    StepResult {
        candidate,
        velocity: vel,
        jumped,
    }
}
