//! Constant-rate UDP sender.

use crate::sim::time::duration_nanos;
use crate::sim::{Datagram, NodeId, SimTime};
use std::net::SocketAddrV4;
use std::time::Duration;

/// Packet size and data rate shared by every sender of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderProfile {
    pub packet_size: u32,
    pub data_rate_bps: u64,
}

impl Default for SenderProfile {
    fn default() -> Self {
        SenderProfile {
            packet_size: 1000,
            data_rate_bps: 1_000_000,
        }
    }
}

impl SenderProfile {
    /// Time between consecutive packets at the configured rate, never less
    /// than one nanosecond.
    pub fn packet_gap(&self) -> Duration {
        if self.data_rate_bps == 0 {
            return Duration::MAX;
        }
        let nanos = self.exact_gap_nanos().max(1);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Whether the clock can represent the gap between two packets.
    pub fn has_resolvable_gap(&self) -> bool {
        self.data_rate_bps > 0 && self.exact_gap_nanos() > 0
    }

    fn exact_gap_nanos(&self) -> u128 {
        let bits = u128::from(self.packet_size) * 8;
        bits * 1_000_000_000 / u128::from(self.data_rate_bps)
    }
}

/// On/off application with a zero off period: sends back to back while
/// active.
#[derive(Debug, Clone)]
pub struct OnOffSender {
    node: NodeId,
    local: SocketAddrV4,
    remote: SocketAddrV4,
    profile: SenderProfile,
    start: SimTime,
    stop: SimTime,
    active: bool,
    tx_packets: u64,
    tx_bytes: u64,
}

impl OnOffSender {
    pub fn new(
        node: NodeId,
        local: SocketAddrV4,
        remote: SocketAddrV4,
        profile: SenderProfile,
        start: SimTime,
        stop: SimTime,
    ) -> Self {
        OnOffSender {
            node,
            local,
            remote,
            profile,
            start,
            stop,
            active: false,
            tx_packets: 0,
            tx_bytes: 0,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn remote(&self) -> SocketAddrV4 {
        self.remote
    }

    pub fn start_time(&self) -> SimTime {
        self.start
    }

    pub fn stop_time(&self) -> SimTime {
        self.stop
    }

    pub(crate) fn set_start_time(&mut self, start: SimTime) {
        self.start = start;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tx_packets(&self) -> u64 {
        self.tx_packets
    }

    pub fn tx_bytes(&self) -> u64 {
        self.tx_bytes
    }

    /// Switch the sender on. Has no effect if the stop time has passed.
    pub fn start(&mut self, now: SimTime) {
        self.active = now < self.stop;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Emit one packet at `now` and return it with the time of the following
    /// send, if that still falls before the stop time.
    pub fn send(&mut self, now: SimTime) -> Option<(Datagram, Option<SimTime>)> {
        if !self.active || now >= self.stop {
            self.active = false;
            return None;
        }
        self.tx_packets += 1;
        self.tx_bytes += u64::from(self.profile.packet_size);
        let datagram = Datagram {
            source: self.local,
            destination: self.remote,
            len: self.profile.packet_size,
        };
        let gap = self.profile.packet_gap();
        let next = if duration_nanos(gap) == u64::MAX {
            None
        } else {
            Some(now + gap).filter(|&at| at < self.stop)
        };
        Some((datagram, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn sender(profile: SenderProfile, stop: f64) -> OnOffSender {
        OnOffSender::new(
            2,
            SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 3), 49153),
            SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, 1), 9),
            profile,
            SimTime::ZERO,
            SimTime::from_secs_f64(stop),
        )
    }

    #[test]
    fn test_packet_gap() {
        assert_eq!(SenderProfile::default().packet_gap(), Duration::from_millis(8));
        let one_per_second = SenderProfile {
            packet_size: 1000,
            data_rate_bps: 8000,
        };
        assert_eq!(one_per_second.packet_gap(), Duration::from_secs(1));
    }

    #[test]
    fn test_packet_gap_below_clock_resolution() {
        let too_fast = SenderProfile {
            packet_size: 1,
            data_rate_bps: 10_000_000_000,
        };
        assert!(!too_fast.has_resolvable_gap());
        assert_eq!(too_fast.packet_gap(), Duration::from_nanos(1));

        let one_nanosecond = SenderProfile {
            packet_size: 1,
            data_rate_bps: 8_000_000_000,
        };
        assert!(one_nanosecond.has_resolvable_gap());
        assert_eq!(one_nanosecond.packet_gap(), Duration::from_nanos(1));
        assert!(SenderProfile::default().has_resolvable_gap());
    }

    #[test]
    fn test_sends_until_stop() {
        let profile = SenderProfile {
            packet_size: 1000,
            data_rate_bps: 8000,
        };
        let mut sender = sender(profile, 4.999);
        sender.start(SimTime::ZERO);

        let mut sends = Vec::new();
        let mut at = Some(SimTime::ZERO);
        while let Some(now) = at {
            let (datagram, next) = sender.send(now).unwrap();
            assert_eq!(datagram.len, 1000);
            sends.push(now.as_secs_f64());
            at = next;
        }
        assert_eq!(sends, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(sender.tx_packets(), 5);
        assert_eq!(sender.tx_bytes(), 5000);
    }

    #[test]
    fn test_stopped_sender_is_silent() {
        let mut sender = sender(SenderProfile::default(), 10.0);
        assert!(sender.send(SimTime::ZERO).is_none());

        sender.start(SimTime::ZERO);
        assert!(sender.send(SimTime::ZERO).is_some());
        sender.stop();
        assert!(sender.send(SimTime::from_secs_f64(1.0)).is_none());

        sender.start(SimTime::from_secs_f64(11.0));
        assert!(!sender.is_active());
    }
}
