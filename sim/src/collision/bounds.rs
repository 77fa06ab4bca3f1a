//! Outer room-bound resolution.
//!
//! Clamps a candidate planar position into the room's walkable bounds,
//! inset by the avatar radius. Resolving an already-valid point returns it
//! unchanged.

use crate::math::Vec2;
use crate::room::RoomBounds;

/// Result of clamping a candidate (x, z) against the room bounds.
#[derive(Clone, Copy, Debug)]
pub struct BoundsResult {
    pub x: f32,
    pub z: f32,
    /// Whether the candidate was outside and had to be corrected.
    pub collided: bool,
}

/// Clamp `(x, z)` into `bounds` inset by `avatar_radius`.
pub fn clamp_to_bounds(bounds: &RoomBounds, x: f32, z: f32, avatar_radius: f32) -> BoundsResult {
    match *bounds {
        RoomBounds::Rect { min, max } => {
            let inset_min = Vec2::new(min.x + avatar_radius, min.y + avatar_radius);
            let inset_max = Vec2::new(max.x - avatar_radius, max.y - avatar_radius);

            // Degenerate room smaller than the avatar: collapse to center.
            if inset_min.x > inset_max.x || inset_min.y > inset_max.y {
                let cx = (min.x + max.x) * 0.5;
                let cz = (min.y + max.y) * 0.5;
                return BoundsResult {
                    x: cx,
                    z: cz,
                    collided: true,
                };
            }

            let nx = x.clamp(inset_min.x, inset_max.x);
            let nz = z.clamp(inset_min.y, inset_max.y);
            BoundsResult {
                x: nx,
                z: nz,
                collided: nx != x || nz != z,
            }
        }
        RoomBounds::Circle { center, radius } => {
            let limit = (radius - avatar_radius).max(0.0);
            let dx = x - center.x;
            let dz = z - center.y;
            let dist_sq = dx * dx + dz * dz;
            if dist_sq <= limit * limit {
                return BoundsResult {
                    x,
                    z,
                    collided: false,
                };
            }

            // Project back onto the circle via the polar angle.
            let angle = dz.atan2(dx);
            BoundsResult {
                x: center.x + angle.cos() * limit,
                z: center.y + angle.sin() * limit,
                collided: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f32 = 0.4;

    fn rect() -> RoomBounds {
        RoomBounds::Rect {
            min: Vec2::new(-5.0, -5.0),
            max: Vec2::new(5.0, 5.0),
        }
    }

    fn circle() -> RoomBounds {
        RoomBounds::Circle {
            center: Vec2::new(0.0, 0.0),
            radius: 5.0,
        }
    }

    #[test]
    fn rect_clamp_insets_by_avatar_radius() {
        let r = clamp_to_bounds(&rect(), 10.0, 0.0, R);
        assert!(r.collided);
        assert!((r.x - (5.0 - R)).abs() < 1.0e-6);
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn valid_points_pass_through_unchanged() {
        // Idempotence: resolving an already-valid point is the identity.
        for bounds in [rect(), circle()] {
            let r = clamp_to_bounds(&bounds, 1.25, -2.5, R);
            assert!(!r.collided);
            assert_eq!((r.x, r.z), (1.25, -2.5));
            let again = clamp_to_bounds(&bounds, r.x, r.z, R);
            assert_eq!((again.x, again.z), (r.x, r.z));
        }
    }

    #[test]
    fn circle_projection_preserves_the_polar_angle() {
        let r = clamp_to_bounds(&circle(), 8.0, 6.0, R);
        assert!(r.collided);
        // Planar distance on the inset circle.
        let dist = (r.x * r.x + r.z * r.z).sqrt();
        assert!((dist - (5.0 - R)).abs() < 1.0e-5);
        // Angle unchanged.
        assert!((r.z / r.x - 6.0 / 8.0).abs() < 1.0e-5);
    }

    #[test]
    fn projected_point_is_itself_valid() {
        let first = clamp_to_bounds(&circle(), 100.0, -40.0, R);
        let second = clamp_to_bounds(&circle(), first.x, first.z, R);
        assert!(!second.collided);
    }

    #[test]
    fn degenerate_rect_collapses_to_center() {
        let tiny = RoomBounds::Rect {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(0.5, 0.5),
        };
        let r = clamp_to_bounds(&tiny, 3.0, 3.0, R);
        assert!(r.collided);
        assert!((r.x - 0.25).abs() < 1.0e-6);
    }
}
