//! Remote-avatar snapshots and render interpolation.
//!
//! Only the latest snapshot per entity is retained; late or duplicate
//! snapshots simply overwrite. Each tick the render state is exponentially
//! smoothed toward the snapshot target with a factor derived from the
//! tick's own dt, so render fidelity does not depend on client frame
//! rate. Seated snapshots snap immediately (no smoothing lag into
//! furniture). If no new snapshot arrives the previous target is held;
//! there is no extrapolation and no freeze-then-jump.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{InterpConfig, NetConfig};
use crate::fault::SimFault;
use crate::math::{Quat, Vec3, quat_from_yaw, shortest_arc, wrap_angle};
use crate::room::SeatId;

/// Identifier for a remote entity, assigned by the transport.
pub type RemoteId = u64;

/// Last authoritative state received for one remote entity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    pub position: Vec3,
    pub yaw: f32,
    /// The seat this entity occupies, if seated. Carried as an id (not a
    /// bare flag) so local seat eligibility can exclude taken seats.
    pub seat: Option<SeatId>,
    pub mounted: bool,
    /// Simulation-clock receipt time (seconds); stamped when the inbox is
    /// drained at the start of a tick.
    #[serde(skip)]
    pub received_at_s: f64,
}

/// The smoothed transform actually handed to rendering.
#[derive(Clone, Copy, Debug)]
pub struct RemoteRenderState {
    pub position: Vec3,
    pub yaw: f32,
}

impl RemoteRenderState {
    /// Yaw as a quaternion for the scene-graph handoff.
    #[inline]
    pub fn orientation(&self) -> Quat {
        quat_from_yaw(self.yaw)
    }
}

#[derive(Debug)]
struct RemoteEntry {
    snapshot: RemoteSnapshot,
    render: RemoteRenderState,
    /// StaleSnapshot is reported once per stale period, re-armed by the
    /// next fresh snapshot.
    stale_reported: bool,
}

/// Per-entity snapshot table. Single writer (the tick driver draining the
/// inbox), many readers.
#[derive(Debug, Default)]
pub struct RemoteTable {
    entries: HashMap<RemoteId, RemoteEntry>,
}

impl RemoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite (or create) the latest snapshot for `id`. New entities
    /// start rendering exactly at their first snapshot.
    pub fn apply_snapshot(&mut self, id: RemoteId, mut snapshot: RemoteSnapshot, now_s: f64) {
        snapshot.received_at_s = now_s;
        snapshot.yaw = wrap_angle(snapshot.yaw);
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.snapshot = snapshot;
                entry.stale_reported = false;
            }
            None => {
                self.entries.insert(
                    id,
                    RemoteEntry {
                        snapshot,
                        render: RemoteRenderState {
                            position: snapshot.position,
                            yaw: snapshot.yaw,
                        },
                        stale_reported: false,
                    },
                );
            }
        }
    }

    /// Drop an entity that left the room.
    pub fn remove(&mut self, id: RemoteId) {
        self.entries.remove(&id);
    }

    /// Discard everything (room change).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self, id: RemoteId) -> Option<&RemoteSnapshot> {
        self.entries.get(&id).map(|e| &e.snapshot)
    }

    pub fn render_state(&self, id: RemoteId) -> Option<&RemoteRenderState> {
        self.entries.get(&id).map(|e| &e.render)
    }

    pub fn iter_render(&self) -> impl Iterator<Item = (RemoteId, &RemoteRenderState)> {
        self.entries.iter().map(|(id, e)| (*id, &e.render))
    }

    /// Seats currently claimed by remote entities.
    pub fn occupied_seats(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.entries.values().filter_map(|e| e.snapshot.seat)
    }

    /// Smooth every render state toward its snapshot target for one tick.
    /// Returns stale-entity faults (at most one per entity per stale
    /// period).
    pub fn interpolate_all(
        &mut self,
        interp: &InterpConfig,
        net: &NetConfig,
        dt_s: f32,
        now_s: f64,
        faults: &mut Vec<SimFault>,
    ) {
        let dt = dt_s.max(0.0);
        let pos_alpha = 1.0 - (-interp.position_rate * dt).exp();
        let yaw_alpha = 1.0 - (-interp.yaw_rate * dt).exp();

        for (id, entry) in &mut self.entries {
            let target = &entry.snapshot;

            if target.seat.is_some() {
                // Seated: snap, no smoothing lag into the furniture.
                entry.render.position = target.position;
                entry.render.yaw = target.yaw;
            } else {
                entry.render.position += (target.position - entry.render.position) * pos_alpha;
                entry.render.yaw = wrap_angle(
                    entry.render.yaw + shortest_arc(entry.render.yaw, target.yaw) * yaw_alpha,
                );
            }

            // Hold the target when data goes quiet; report staleness once.
            let age = now_s - target.received_at_s;
            if age > f64::from(net.snapshot_stale_after_s) && !entry.stale_reported {
                entry.stale_reported = true;
                log::debug!("remote entity {id} snapshot is stale ({age:.2}s)");
                faults.push(SimFault::StaleSnapshot { id: *id });
            }
        }
    }
}
