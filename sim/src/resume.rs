//! Best-effort persisted local position.
//!
//! The embedding application may persist the last local position and feed
//! it back on room entry. It is a non-authoritative hint: consumed only
//! when the room matches and the record is fresh; the room spawn wins
//! otherwise.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Default freshness window for a resume hint (milliseconds).
pub const DEFAULT_RESUME_MAX_AGE_MS: i64 = 10 * 60 * 1000;

/// Externally persisted `{x, y, z, room, timestamp}` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedLocation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub room: String,
    /// Unix epoch milliseconds at persist time.
    pub timestamp_ms: i64,
}

impl PersistedLocation {
    /// The resume position, if this record applies to `room` and is no
    /// older than `max_age_ms` at `now_ms`.
    pub fn resume_position(&self, room: &str, now_ms: i64, max_age_ms: i64) -> Option<Vec3> {
        if self.room != room {
            return None;
        }
        let age = now_ms - self.timestamp_ms;
        if age < 0 || age > max_age_ms {
            return None;
        }
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return None;
        }
        Some(Vec3::new(self.x, self.y, self.z))
    }
}
