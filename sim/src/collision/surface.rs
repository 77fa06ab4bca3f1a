//! Height-collider resolution.
//!
//! A height collider is a solid box. An avatar whose feet are at or above
//! the top (within tolerance) stands on it and is not blocked; an avatar
//! whose vertical span overlaps the box body is pushed out horizontally
//! along the axis of minimum penetration.

use crate::room::HeightCollider;

/// Contact classification for one collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderContact {
    /// No planar overlap or no vertical interaction.
    None,
    /// Feet at/above the top: standable, contributes a ground candidate,
    /// does not block horizontal motion.
    Stand { height: f32 },
    /// Body overlap: pushed out to the given planar position.
    Pushed { x: f32, z: f32 },
}

/// Classify the avatar against one collider.
///
/// `feet_y` is the avatar's feet height; the avatar occupies
/// `feet_y .. feet_y + avatar_height` vertically and a disc of
/// `avatar_radius` horizontally.
pub fn resolve_collider(
    c: &HeightCollider,
    x: f32,
    z: f32,
    feet_y: f32,
    avatar_radius: f32,
    avatar_height: f32,
    ground_tolerance: f32,
) -> ColliderContact {
    // Footprint expanded by the avatar radius.
    let ex_min_x = c.min.x - avatar_radius;
    let ex_max_x = c.max.x + avatar_radius;
    let ex_min_z = c.min.y - avatar_radius;
    let ex_max_z = c.max.y + avatar_radius;

    let inside = x > ex_min_x && x < ex_max_x && z > ex_min_z && z < ex_max_z;
    if !inside {
        return ColliderContact::None;
    }

    // Standable: feet at/above the top within tolerance.
    if feet_y >= c.top - ground_tolerance {
        return ColliderContact::Stand { height: c.top };
    }

    // Body overlap check on the vertical span.
    let head_y = feet_y + avatar_height;
    if head_y <= c.bottom {
        return ColliderContact::None;
    }

    // Push out along the axis of minimum penetration.
    let push_left = x - ex_min_x;
    let push_right = ex_max_x - x;
    let push_back = z - ex_min_z;
    let push_front = ex_max_z - z;

    let min_push = push_left.min(push_right).min(push_back).min(push_front);
    if min_push == push_left {
        ColliderContact::Pushed { x: ex_min_x, z }
    } else if min_push == push_right {
        ColliderContact::Pushed { x: ex_max_x, z }
    } else if min_push == push_back {
        ColliderContact::Pushed { x, z: ex_min_z }
    } else {
        ColliderContact::Pushed { x, z: ex_max_z }
    }
}
