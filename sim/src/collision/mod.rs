/*!
Collision resolution for the local avatar.

The code is split for clarity:

- bounds:  outer room bounds (rect clamp, circle projection)
- surface: height colliders (standable tops, minimum-penetration push-out)
- ground:  standing-height resolution (max of candidates)

One dispatch entry, [`resolve_move`], corrects a candidate position from
the integrator against the active room geometry. With no geometry
published the caller skips resolution for the tick (degraded, never
fatal).
*/

pub mod bounds;
pub mod ground;
pub mod surface;

pub use bounds::clamp_to_bounds;
pub use ground::resolve_ground_height;
pub use surface::{ColliderContact, resolve_collider};

use crate::config::PhysicsConfig;
use crate::math::Vec3;
use crate::room::{RoomGeometry, RoomHooks};

/// Candidate state from the integrator.
#[derive(Clone, Copy, Debug)]
pub struct ResolveParams {
    /// Candidate position (feet) for this tick.
    pub candidate: Vec3,
    /// Vertical velocity after integration (m/s).
    pub vertical_velocity: f32,
}

/// Corrected state after collision resolution.
#[derive(Clone, Copy, Debug)]
pub struct Resolved {
    /// Final position for this tick. `position.y` is never below
    /// `ground_height`.
    pub position: Vec3,
    /// Whether any horizontal correction was applied.
    pub collided: bool,
    /// Whether the avatar has ground support after resolution.
    pub grounded: bool,
    /// The standing height resolved at the final (x, z).
    pub ground_height: f32,
}

/// Resolve a candidate position against the room geometry.
///
/// Order: clamp into the outer bounds, push out of height-collider bodies,
/// then resolve the standing height at the corrected planar position and
/// land if descending onto it.
pub fn resolve_move(
    cfg: &PhysicsConfig,
    geometry: &RoomGeometry,
    hooks: Option<&dyn RoomHooks>,
    p: ResolveParams,
) -> Resolved {
    let feet_y = p.candidate.y;

    // 1) Outer bounds.
    let b = clamp_to_bounds(&geometry.bounds, p.candidate.x, p.candidate.z, cfg.avatar_radius_m);
    let mut x = b.x;
    let mut z = b.z;
    let mut collided = b.collided;

    // 2) Height-collider bodies. One pass; push-outs are axis-aligned and
    // rooms do not stack colliders densely enough to need iteration.
    for c in &geometry.colliders {
        match resolve_collider(
            c,
            x,
            z,
            feet_y,
            cfg.avatar_radius_m,
            cfg.avatar_height_m,
            cfg.ground_tolerance_m,
        ) {
            ColliderContact::Pushed { x: nx, z: nz } => {
                x = nx;
                z = nz;
                collided = true;
            }
            ColliderContact::Stand { .. } | ColliderContact::None => {}
        }
    }

    // 3) Standing height at the corrected planar position.
    let ground_height = resolve_ground_height(
        geometry,
        hooks,
        x,
        z,
        feet_y,
        p.vertical_velocity,
        cfg.ground_tolerance_m,
    );

    // 4) Land when descending onto (or through) the resolved surface.
    let descending = p.vertical_velocity <= 0.0;
    let (y, grounded) = if descending && feet_y <= ground_height + cfg.ground_tolerance_m {
        (ground_height, true)
    } else {
        // Never below ground, even when ascending.
        (feet_y.max(ground_height), false)
    };

    Resolved {
        position: Vec3::new(x, y, z),
        collided,
        grounded,
        ground_height,
    }
}
