//! Receive side of a measured flow.

use super::counters::Counters;
use crate::sim::{Datagram, NodeId, SimTime};
use log::{debug, warn};
use std::collections::VecDeque;
use std::net::SocketAddrV4;

/// UDP sink bound to a node address and port.
///
/// Arrivals are queued on the socket. The first arrival of a batch asks for a
/// readable notification; [`PacketSink::on_receive`] then drains the whole
/// queue in arrival order.
#[derive(Debug)]
pub struct PacketSink {
    node: NodeId,
    local: SocketAddrV4,
    pending: VecDeque<Datagram>,
    notify_pending: bool,
    open: bool,
    rx_packets: u64,
    rx_bytes: u64,
}

impl PacketSink {
    pub fn bind(node: NodeId, local: SocketAddrV4) -> Self {
        PacketSink {
            node,
            local,
            pending: VecDeque::new(),
            notify_pending: false,
            open: true,
            rx_packets: 0,
            rx_bytes: 0,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn local(&self) -> SocketAddrV4 {
        self.local
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Lifetime number of datagrams drained by this sink.
    pub fn rx_packets(&self) -> u64 {
        self.rx_packets
    }

    pub fn rx_bytes(&self) -> u64 {
        self.rx_bytes
    }

    /// Queue an arriving datagram.
    ///
    /// Returns `true` when the caller must schedule a readable notification,
    /// i.e. for the first arrival since the queue was last drained. Datagrams
    /// arriving after the sink was closed are discarded.
    pub fn enqueue(&mut self, datagram: Datagram) -> bool {
        if !self.open {
            return false;
        }
        self.pending.push_back(datagram);
        if self.notify_pending {
            false
        } else {
            self.notify_pending = true;
            true
        }
    }

    /// Drain every pending datagram into `counters`. Returns how many were read.
    pub fn on_receive(&mut self, counters: &mut Counters, now: SimTime) -> usize {
        self.notify_pending = false;
        let mut read = 0;
        while let Some(datagram) = self.pending.pop_front() {
            let len = u64::from(datagram.len);
            counters.record(len);
            self.rx_packets += 1;
            self.rx_bytes += len;
            read += 1;
            debug!("{} {} received one packet from {}", now.as_secs_f64(), self.node, datagram.source.ip());
        }
        read
    }

    /// Close the socket, discarding anything still queued. Returns the number
    /// of datagrams discarded.
    pub fn close(&mut self) -> usize {
        self.open = false;
        self.notify_pending = false;
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            warn!("Sink {} on node {} closed with {} unread datagrams", self.local, self.node, dropped);
        }
        dropped
    }
}
