//! Standing-height resolution.
//!
//! The resolved ground height at a planar position is the maximum of:
//! - the literal floor plane,
//! - tops of height colliders the avatar is over (and above),
//! - landing surfaces, consulted only while descending and within their
//!   height window,
//! - the room collaborator's landing query.
//!
//! Ties favor the higher surface (max handles this). Candidates above the
//! avatar's feet are ignored: you can only stand on what you are over.

use crate::room::{RoomGeometry, RoomHooks};

/// Resolve the standing ground height at `(x, z)` for feet at `feet_y`
/// moving with vertical velocity `vy`.
pub fn resolve_ground_height(
    geometry: &RoomGeometry,
    hooks: Option<&dyn RoomHooks>,
    x: f32,
    z: f32,
    feet_y: f32,
    vy: f32,
    ground_tolerance: f32,
) -> f32 {
    let mut best = geometry.floor_height;

    // Collider tops the avatar is over and at/above.
    for c in &geometry.colliders {
        let over = x >= c.min.x && x <= c.max.x && z >= c.min.y && z <= c.max.y;
        if over && feet_y >= c.top - ground_tolerance && c.top > best {
            best = c.top;
        }
    }

    // Landing surfaces catch descending avatars within their window.
    if vy <= 0.0 {
        for l in &geometry.landings {
            if !l.region.contains(x, z) {
                continue;
            }
            let within_window =
                feet_y >= l.height - ground_tolerance && feet_y <= l.height + l.window;
            if within_window && l.height > best {
                best = l.height;
            }
        }
    }

    // Room-specific landing query (trampolines, shared ride objects).
    if let Some(hooks) = hooks {
        if let Some(h) = hooks.landing_height(x, z, feet_y) {
            if h > best && h <= feet_y + ground_tolerance {
                best = h;
            }
        }
    }

    best
}
