//! Math aliases and small planar helpers shared across the simulation.
//!
//! This module intentionally contains no algorithms beyond angle/planar
//! bookkeeping; component logic lives with the components.

use std::f32::consts::{PI, TAU};

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Planar (XZ) distance squared between two world positions (meters^2).
#[inline]
pub fn planar_distance_sq(a: &Vec3, b: &Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Yaw (radians) facing along a planar delta, if the delta is meaningful.
///
/// Convention: `yaw = (-dx).atan2(-dz)`, matching the server's transform
/// encoding. Returns `None` for negligible deltas so callers keep the
/// current facing instead of snapping to an arbitrary angle.
#[inline]
pub fn yaw_from_xz(xz: Vec2) -> Option<f32> {
    const YAW_EPS_SQ: f32 = 1.0e-12;
    if xz.norm_squared() > YAW_EPS_SQ {
        return Some((-xz.x).atan2(-xz.y));
    }
    None
}

/// Unit forward vector in the XZ plane for a given yaw.
///
/// Inverse of [`yaw_from_xz`]: `yaw_from_xz(forward_from_yaw(y)) == Some(y)`.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec2 {
    Vec2::new(-yaw.sin(), -yaw.cos())
}

/// Unit right vector in the XZ plane for a given yaw (forward x up).
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec2 {
    let f = forward_from_yaw(yaw);
    // cross((fx, 0, fz), +Y) = (-fz, 0, fx)
    Vec2::new(-f.y, f.x)
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let mut r = a % TAU;
    if r <= -PI {
        r += TAU;
    } else if r > PI {
        r -= TAU;
    }
    r
}

/// Signed shortest angular delta from `from` to `to`, in `(-PI, PI]`.
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Yaw-only rotation (about +Y) as a quaternion, for render handoff.
#[inline]
pub fn quat_from_yaw(yaw: f32) -> Quat {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw)
}
