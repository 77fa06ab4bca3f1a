/*!
Room geometry and seat data.

A [`RoomGeometry`] is published once by the room-load collaborator when a
room activates and is read-only afterwards. Dispatch over the room shape is
a tagged variant ([`RoomBounds`]), not string tags. Seats are static
per-room data described by [`SeatDescriptor`].
*/

use crate::math::{Vec2, Vec3, forward_from_yaw, planar_distance_sq};

/// Planar region used by landing surfaces and height colliders.
#[derive(Clone, Copy, Debug)]
pub enum PlanarRegion {
    /// Axis-aligned rectangle: `min..max` on X and Z.
    Rect { min: Vec2, max: Vec2 },
    /// Circle around `center` (XZ) with `radius` meters.
    Circle { center: Vec2, radius: f32 },
}

impl PlanarRegion {
    /// Whether `(x, z)` lies inside the region.
    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        match *self {
            PlanarRegion::Rect { min, max } => {
                x >= min.x && x <= max.x && z >= min.y && z <= max.y
            }
            PlanarRegion::Circle { center, radius } => {
                let dx = x - center.x;
                let dz = z - center.y;
                dx * dx + dz * dz <= radius * radius
            }
        }
    }
}

/// Outer walkable bounds of a room.
#[derive(Clone, Copy, Debug)]
pub enum RoomBounds {
    /// Rectangular room: walls at the rectangle edges.
    Rect { min: Vec2, max: Vec2 },
    /// Circular room: wall at `radius` from `center`.
    Circle { center: Vec2, radius: f32 },
}

/// A solid box the avatar can stand on or be pushed out of.
///
/// If the avatar's feet are at or above `top` (within tolerance) the box is
/// a standable surface; otherwise an overlapping avatar is pushed out along
/// the axis of minimum penetration.
#[derive(Clone, Copy, Debug)]
pub struct HeightCollider {
    /// Planar footprint minimum corner (X, Z).
    pub min: Vec2,
    /// Planar footprint maximum corner (X, Z).
    pub max: Vec2,
    /// Bottom of the box (world Y, meters).
    pub bottom: f32,
    /// Top of the box (world Y, meters). Standable.
    pub top: f32,
}

/// A region at a fixed height that catches a descending avatar.
///
/// Consulted only while vertical velocity is non-positive, and only when
/// the avatar's feet are within `window` meters above `height`.
#[derive(Clone, Copy, Debug)]
pub struct LandingSurface {
    pub region: PlanarRegion,
    /// Surface height (world Y, meters).
    pub height: f32,
    /// How far above the surface a descending avatar is captured (meters).
    pub window: f32,
}

/// Identifier for a seat within a room.
pub type SeatId = u32;

/// Which side of the seat the avatar is displaced toward on dismount.
///
/// Explicit per-seat data; some source content dismounts left, some right,
/// depending on surrounding furniture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismountSide {
    Left,
    Right,
}

impl DismountSide {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            DismountSide::Left => -1.0,
            DismountSide::Right => 1.0,
        }
    }
}

/// Static data describing one occupiable seat.
#[derive(Clone, Debug)]
pub struct SeatDescriptor {
    pub id: SeatId,
    /// Seat base position in world space (Y is the supporting surface).
    pub position: Vec3,
    /// Seat facing (radians, same yaw convention as avatars).
    pub yaw: f32,
    /// Height of the sitting pose above `position.y` (meters).
    pub seat_height: f32,
    /// Planar snap-point offsets in seat-local space (rotated by `yaw`
    /// when resolved). A bench has several; a stool has one.
    pub snap_offsets: Vec<Vec2>,
    /// Seat can be faced either way (benches); final facing is chosen from
    /// the approach direction.
    pub bidirectional: bool,
    /// If the seat sits on an elevated platform, dismount lands at this
    /// height instead of ground level.
    pub platform_height: Option<f32>,
    /// Side the avatar is displaced toward when standing up.
    pub dismount_side: DismountSide,
}

impl SeatDescriptor {
    /// World position of snap point `index` (planar offsets rotated by the
    /// seat yaw; Y is the seat base).
    pub fn snap_point_world(&self, index: usize) -> Vec3 {
        let offset = self
            .snap_offsets
            .get(index)
            .copied()
            .unwrap_or_else(Vec2::zeros);
        let (sin, cos) = self.yaw.sin_cos();
        // Rotate the local (x, z) offset by yaw about +Y.
        let wx = offset.x * cos + offset.y * sin;
        let wz = -offset.x * sin + offset.y * cos;
        Vec3::new(self.position.x + wx, self.position.y, self.position.z + wz)
    }

    /// Index of the snap point nearest to `from` by planar distance, with
    /// its world position. Seats always have at least the implicit center
    /// snap point.
    pub fn nearest_snap_point(&self, from: &Vec3) -> (usize, Vec3) {
        let count = self.snap_offsets.len().max(1);
        let mut best = (0, self.snap_point_world(0));
        let mut best_d = planar_distance_sq(&best.1, from);
        for i in 1..count {
            let world = self.snap_point_world(i);
            let d = planar_distance_sq(&world, from);
            if d < best_d {
                best = (i, world);
                best_d = d;
            }
        }
        best
    }

    /// Final facing for an avatar approaching from `from`.
    ///
    /// Bidirectional seats flip by PI when the approach comes from behind
    /// (negative dot of seat forward and seat-to-avatar).
    pub fn facing_for_approach(&self, from: &Vec3) -> f32 {
        if !self.bidirectional {
            return self.yaw;
        }
        let fwd = forward_from_yaw(self.yaw);
        let to_avatar = Vec2::new(from.x - self.position.x, from.z - self.position.z);
        if fwd.dot(&to_avatar) < 0.0 {
            crate::math::wrap_angle(self.yaw + std::f32::consts::PI)
        } else {
            self.yaw
        }
    }
}

/// Immutable geometry for one active room.
#[derive(Clone, Debug)]
pub struct RoomGeometry {
    pub bounds: RoomBounds,
    /// Height of the literal ground plane (world Y, meters).
    pub floor_height: f32,
    /// Solid furniture/structure boxes.
    pub colliders: Vec<HeightCollider>,
    /// Fixed-height landing regions (pool edges, platforms).
    pub landings: Vec<LandingSurface>,
    /// Occupiable seats.
    pub seats: Vec<SeatDescriptor>,
}

impl RoomGeometry {
    pub fn seat(&self, id: SeatId) -> Option<&SeatDescriptor> {
        self.seats.iter().find(|s| s.id == id)
    }
}

/// Room-specific hooks supplied by the room-load collaborator.
///
/// Rooms with bespoke physics (a trampoline, a shared ride object) answer
/// landing queries here; most rooms need none.
pub trait RoomHooks {
    /// Extra ground-height candidate at `(x, z)` for feet at `feet_y`,
    /// if this room contributes one.
    fn landing_height(&self, x: f32, z: f32, feet_y: f32) -> Option<f32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn bench() -> SeatDescriptor {
        SeatDescriptor {
            id: 1,
            position: Vec3::new(10.0, 0.0, 10.0),
            yaw: 0.0,
            seat_height: 0.8,
            snap_offsets: vec![Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0)],
            bidirectional: true,
            platform_height: None,
            dismount_side: DismountSide::Right,
        }
    }

    #[test]
    fn nearest_snap_point_picks_by_planar_distance() {
        let seat = bench();
        let from = Vec3::new(10.6, 0.0, 10.0);
        let (idx, world) = seat.nearest_snap_point(&from);
        assert_eq!(idx, 1);
        assert!((world.x - 10.5).abs() < 1.0e-6);
    }

    #[test]
    fn snap_offsets_rotate_with_seat_yaw() {
        let mut seat = bench();
        seat.yaw = PI / 2.0;
        // A local +X offset rotated 90 degrees lands on the Z axis.
        let world = seat.snap_point_world(1);
        assert!((world.x - 10.0).abs() < 1.0e-5);
        assert!((world.z - 9.5).abs() < 1.0e-5, "z = {}", world.z);
    }

    #[test]
    fn bidirectional_seat_flips_facing_for_rear_approach() {
        let seat = bench();
        let fwd = forward_from_yaw(seat.yaw);
        let front = seat.position + Vec3::new(fwd.x, 0.0, fwd.y);
        let back = seat.position - Vec3::new(fwd.x, 0.0, fwd.y);

        assert!((seat.facing_for_approach(&front) - seat.yaw).abs() < 1.0e-6);
        let flipped = seat.facing_for_approach(&back);
        assert!(
            crate::math::shortest_arc(seat.yaw + PI, flipped).abs() < 1.0e-6,
            "flipped = {flipped}"
        );
    }

    #[test]
    fn unidirectional_seat_keeps_its_yaw() {
        let mut seat = bench();
        seat.bidirectional = false;
        let back = Vec3::new(10.0, 0.0, 11.0);
        assert_eq!(seat.facing_for_approach(&back), seat.yaw);
    }

    #[test]
    fn planar_region_containment() {
        let rect = PlanarRegion::Rect {
            min: Vec2::new(-1.0, -1.0),
            max: Vec2::new(1.0, 1.0),
        };
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(1.0, -1.0));
        assert!(!rect.contains(1.1, 0.0));

        let circle = PlanarRegion::Circle {
            center: Vec2::new(5.0, 5.0),
            radius: 2.0,
        };
        assert!(circle.contains(6.0, 5.0));
        assert!(!circle.contains(7.1, 5.0));
    }
}
