//! Non-fatal fault taxonomy.
//!
//! Every fault in this core degrades to "do nothing harmful this tick" and
//! recovers locally; nothing here propagates as an error to the embedding
//! application. Faults are collected into the per-tick report and logged at
//! the site where they are detected.

use thiserror::Error;

use crate::remote::RemoteId;

/// A locally-recovered degradation observed during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SimFault {
    /// Room geometry not yet published; collision was skipped this tick.
    #[error("room geometry not yet available, collision skipped")]
    MissingGeometry,

    /// No fresh snapshot for a remote entity within the expected interval;
    /// its last interpolation target is held.
    #[error("no fresh snapshot for remote entity {id}")]
    StaleSnapshot { id: RemoteId },

    /// An occupy action fired with no eligible seat in range.
    #[error("no eligible seat within interaction radius")]
    InvalidSeatTarget,

    /// Raw delta time exceeded the safety cap and was clamped.
    #[error("frame hitch: raw dt {raw_dt}s exceeded the safety cap")]
    FrameHitch { raw_dt: f32 },

    /// Transport reported a disconnect; outbound sends pause until
    /// reconnection, local simulation continues.
    #[error("network transport disconnected")]
    NetworkDisconnect,
}
