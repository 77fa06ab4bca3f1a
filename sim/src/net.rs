//! Network-sync boundary.
//!
//! The transport is a message bus: one outbound `send_position` and an
//! inbound event queue. Outbound sends are throttled to a minimum
//! interval and gated by a dirty check so bandwidth stays bounded without
//! adding latency to local simulation. Inbound events are pushed by the
//! transport callback at any time but consumed only at the start of the
//! next tick, never mid-tick.

use serde::{Deserialize, Serialize};

use crate::config::NetConfig;
use crate::math::{Vec3, planar_distance_sq, shortest_arc};
use crate::remote::{RemoteId, RemoteSnapshot};

/// Outbound seam implemented by the transport collaborator.
pub trait Transport {
    /// Send the local transform. `aux_position` carries a secondary
    /// transform when one exists (the active mount).
    fn send_position(&mut self, position: Vec3, yaw: f32, aux_position: Option<Vec3>);
}

/// Inbound messages from the transport, applied at the next tick boundary.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum InboundEvent {
    /// Latest authoritative state for one remote entity.
    Snapshot {
        id: RemoteId,
        snapshot: RemoteSnapshot,
    },
    /// The entity left the room; destroy its state.
    EntityLeft { id: RemoteId },
    /// Transport lost the connection.
    Disconnected,
    /// Transport reconnected; the next outbound send is forced.
    Reconnected,
}

/// Queue with a single writer (the transport callback) and a single
/// drain point (the start of a tick). Everything is single-threaded, so
/// no locking is needed.
#[derive(Debug, Default)]
pub struct SnapshotInbox {
    events: Vec<InboundEvent>,
}

impl SnapshotInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the registered transport callback.
    pub fn push(&mut self, event: InboundEvent) {
        self.events.push(event);
    }

    /// Take every pending event, in arrival order.
    pub fn drain(&mut self) -> Vec<InboundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Outbound throttle: minimum interval plus a movement dirty-check.
#[derive(Debug)]
pub struct OutboundThrottle {
    last_sent_at_s: Option<f64>,
    last_position: Vec3,
    last_yaw: f32,
    force_next: bool,
}

impl OutboundThrottle {
    pub fn new() -> Self {
        Self {
            last_sent_at_s: None,
            last_position: Vec3::zeros(),
            last_yaw: 0.0,
            force_next: true,
        }
    }

    /// Force the next eligible send regardless of the dirty check
    /// (reconnect, room entry).
    pub fn force_next(&mut self) {
        self.force_next = true;
    }

    /// Send the local transform if the interval has elapsed and the
    /// transform moved past the dirty thresholds. Returns whether a send
    /// happened.
    pub fn maybe_send(
        &mut self,
        cfg: &NetConfig,
        now_s: f64,
        position: Vec3,
        yaw: f32,
        aux_position: Option<Vec3>,
        connected: bool,
        transport: &mut dyn Transport,
    ) -> bool {
        if !connected {
            return false;
        }

        if let Some(last) = self.last_sent_at_s {
            if now_s - last < f64::from(cfg.min_send_interval_s) {
                return false;
            }
        }

        let moved = planar_distance_sq(&self.last_position, &position) > cfg.position_dirty_sq_m2
            || (position.y - self.last_position.y).abs() > cfg.position_dirty_sq_m2.sqrt()
            || shortest_arc(self.last_yaw, yaw).abs() > cfg.yaw_dirty_rad;

        if !moved && !self.force_next {
            return false;
        }

        transport.send_position(position, yaw, aux_position);
        self.last_sent_at_s = Some(now_s);
        self.last_position = position;
        self.last_yaw = yaw;
        self.force_next = false;
        true
    }
}

impl Default for OutboundThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        sends: Vec<(Vec3, f32, Option<Vec3>)>,
    }

    impl Transport for RecordingTransport {
        fn send_position(&mut self, position: Vec3, yaw: f32, aux_position: Option<Vec3>) {
            self.sends.push((position, yaw, aux_position));
        }
    }

    fn cfg() -> NetConfig {
        NetConfig::default()
    }

    #[test]
    fn first_send_goes_out_immediately() {
        let mut throttle = OutboundThrottle::new();
        let mut t = RecordingTransport::default();
        let sent = throttle.maybe_send(&cfg(), 0.0, Vec3::zeros(), 0.0, None, true, &mut t);
        assert!(sent);
        assert_eq!(t.sends.len(), 1);
    }

    #[test]
    fn sends_are_rate_limited() {
        let cfg = cfg();
        let mut throttle = OutboundThrottle::new();
        let mut t = RecordingTransport::default();

        throttle.maybe_send(&cfg, 0.0, Vec3::zeros(), 0.0, None, true, &mut t);
        // Large movement, but inside the minimum interval.
        let sent = throttle.maybe_send(
            &cfg,
            0.01,
            Vec3::new(10.0, 0.0, 0.0),
            0.0,
            None,
            true,
            &mut t,
        );
        assert!(!sent);

        // After the interval it goes out.
        let sent = throttle.maybe_send(
            &cfg,
            0.06,
            Vec3::new(10.0, 0.0, 0.0),
            0.0,
            None,
            true,
            &mut t,
        );
        assert!(sent);
        assert_eq!(t.sends.len(), 2);
    }

    #[test]
    fn clean_transforms_are_not_resent() {
        let cfg = cfg();
        let mut throttle = OutboundThrottle::new();
        let mut t = RecordingTransport::default();

        throttle.maybe_send(&cfg, 0.0, Vec3::zeros(), 0.0, None, true, &mut t);
        // Interval elapsed but nothing moved.
        let sent = throttle.maybe_send(&cfg, 1.0, Vec3::zeros(), 0.0, None, true, &mut t);
        assert!(!sent);

        // Yaw-only change past the threshold is dirty.
        let sent = throttle.maybe_send(&cfg, 2.0, Vec3::zeros(), 0.3, None, true, &mut t);
        assert!(sent);
    }

    #[test]
    fn disconnected_pauses_sends_and_reconnect_forces_one() {
        let cfg = cfg();
        let mut throttle = OutboundThrottle::new();
        let mut t = RecordingTransport::default();

        let sent = throttle.maybe_send(
            &cfg,
            0.0,
            Vec3::new(1.0, 0.0, 0.0),
            0.0,
            None,
            false,
            &mut t,
        );
        assert!(!sent);
        assert!(t.sends.is_empty());

        // On reconnect a forced send goes out even if position matches
        // what we last believed sent.
        throttle.force_next();
        let sent = throttle.maybe_send(&cfg, 1.0, Vec3::zeros(), 0.0, None, true, &mut t);
        assert!(sent);
    }

    #[test]
    fn inbox_drains_in_arrival_order() {
        let mut inbox = SnapshotInbox::new();
        inbox.push(InboundEvent::Disconnected);
        inbox.push(InboundEvent::Reconnected);
        inbox.push(InboundEvent::EntityLeft { id: 4 });

        let events = inbox.drain();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], InboundEvent::Disconnected));
        assert!(matches!(events[2], InboundEvent::EntityLeft { id: 4 }));
        assert!(inbox.is_empty());
    }
}
