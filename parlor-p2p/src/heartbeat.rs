//! Poll-driven liveness monitor.
//!
//! No background threads: the runtime calls `poll(now)` on its own tick
//! and acts on the returned pings and expirations. Any inbound traffic
//! counts as proof of life, not just `PONG`.

use instant::{Duration, Instant};
use parlor_core::PlayerId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct PeerLiveness {
    last_seen: Instant,
    last_ping: Instant,
}

/// What fell due since the last poll
#[derive(Debug, Default)]
pub struct LivenessReport {
    /// Peers that should receive a `PING` now
    pub due_pings: Vec<PlayerId>,
    /// Peers silent past the timeout; already untracked
    pub expired: Vec<PlayerId>,
}

pub struct LivenessMonitor {
    heartbeat_interval: Duration,
    liveness_timeout: Duration,
    peers: HashMap<PlayerId, PeerLiveness>,
}

impl LivenessMonitor {
    pub fn new(heartbeat_interval: Duration, liveness_timeout: Duration) -> Self {
        Self {
            heartbeat_interval,
            liveness_timeout,
            peers: HashMap::new(),
        }
    }

    pub fn track(&mut self, peer: PlayerId, now: Instant) {
        self.peers.insert(
            peer,
            PeerLiveness {
                last_seen: now,
                last_ping: now,
            },
        );
    }

    pub fn forget(&mut self, peer: &PlayerId) {
        self.peers.remove(peer);
    }

    /// Record proof of life for a peer
    pub fn refresh(&mut self, peer: &PlayerId, now: Instant) {
        if let Some(liveness) = self.peers.get_mut(peer) {
            liveness.last_seen = now;
        }
    }

    pub fn is_tracked(&self, peer: &PlayerId) -> bool {
        self.peers.contains_key(peer)
    }

    /// Collect due pings and expirations. Expired peers are removed from
    /// tracking; the caller owns the consequences (roster removal,
    /// synthesized leave).
    pub fn poll(&mut self, now: Instant) -> LivenessReport {
        let mut report = LivenessReport::default();

        self.peers.retain(|peer, liveness| {
            if now.duration_since(liveness.last_seen) >= self.liveness_timeout {
                tracing::warn!(%peer, "peer silent past liveness timeout");
                report.expired.push(peer.clone());
                return false;
            }

            if now.duration_since(liveness.last_ping) >= self.heartbeat_interval {
                liveness.last_ping = now;
                report.due_pings.push(peer.clone());
            }
            true
        });

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> LivenessMonitor {
        LivenessMonitor::new(Duration::from_secs(2), Duration::from_secs(8))
    }

    #[test]
    fn test_fresh_peer_needs_nothing() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.track(PlayerId::from("a"), now);

        let report = monitor.poll(now + Duration::from_millis(500));
        assert!(report.due_pings.is_empty());
        assert!(report.expired.is_empty());
    }

    #[test]
    fn test_ping_falls_due_each_interval() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.track(PlayerId::from("a"), now);

        let report = monitor.poll(now + Duration::from_secs(3));
        assert_eq!(report.due_pings, vec![PlayerId::from("a")]);

        // Immediately after, nothing is due again
        let report = monitor.poll(now + Duration::from_secs(3) + Duration::from_millis(10));
        assert!(report.due_pings.is_empty());
    }

    #[test]
    fn test_refresh_defers_expiry() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.track(PlayerId::from("a"), now);

        monitor.refresh(&PlayerId::from("a"), now + Duration::from_secs(6));

        let report = monitor.poll(now + Duration::from_secs(10));
        assert!(report.expired.is_empty());
        assert!(monitor.is_tracked(&PlayerId::from("a")));
    }

    #[test]
    fn test_silence_past_timeout_expires_within_window() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.track(PlayerId::from("a"), now);

        // Just inside the timeout: still alive
        let report = monitor.poll(now + Duration::from_millis(7_900));
        assert!(report.expired.is_empty());

        // Just past: declared dead exactly once, then untracked
        let report = monitor.poll(now + Duration::from_millis(8_100));
        assert_eq!(report.expired, vec![PlayerId::from("a")]);
        assert!(!monitor.is_tracked(&PlayerId::from("a")));

        let report = monitor.poll(now + Duration::from_secs(20));
        assert!(report.expired.is_empty());
    }

    #[test]
    fn test_forget_stops_tracking() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.track(PlayerId::from("a"), now);
        monitor.forget(&PlayerId::from("a"));

        let report = monitor.poll(now + Duration::from_secs(60));
        assert!(report.expired.is_empty());
    }
}
