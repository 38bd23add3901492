//! Sender/receiver pairing.

use super::onoff::{OnOffSender, SenderProfile};
use crate::config::ConfigError;
use crate::measurement::PacketSink;
use crate::sim::{NodeId, SimTime};
use rand::Rng;
use serde::Serialize;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Senders stop this long before the horizon so the run ends with no
/// transmission in progress.
pub const FLOW_STOP_GUARD: Duration = Duration::from_millis(1);

/// First ephemeral port handed to senders.
pub const SENDER_PORT: u16 = 49153;

/// One measured sender → sink pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flow {
    pub id: usize,
    pub source: NodeId,
    pub sink: NodeId,
    pub address: Ipv4Addr,
    pub port: u16,
}

/// Flows of a run together with their sinks and senders, indexed by flow id.
#[derive(Debug)]
pub struct TrafficPlan {
    flows: Vec<Flow>,
    sinks: Vec<PacketSink>,
    senders: Vec<OnOffSender>,
}

impl TrafficPlan {
    /// Pair the first `num_sinks` nodes (receivers) with the next `num_sinks`
    /// nodes (senders). `addresses[i]` is the address of `nodes[i]`.
    ///
    /// Senders start at time zero and stop [`FLOW_STOP_GUARD`] before
    /// `horizon`. Nodes beyond the first `2 * num_sinks` take no part.
    pub fn build(
        nodes: &[NodeId],
        addresses: &[Ipv4Addr],
        num_sinks: usize,
        port: u16,
        profile: SenderProfile,
        horizon: SimTime,
    ) -> Result<Self, ConfigError> {
        if addresses.len() < nodes.len() {
            return Err(ConfigError::Invalid(format!(
                "{} nodes but only {} addresses",
                nodes.len(),
                addresses.len()
            )));
        }
        let senders_available = nodes.len().saturating_sub(num_sinks);
        if num_sinks == 0 || senders_available < num_sinks {
            return Err(ConfigError::Pairing {
                sinks: num_sinks,
                senders: senders_available,
            });
        }

        let stop = horizon.saturating_sub(FLOW_STOP_GUARD);
        let mut flows = Vec::with_capacity(num_sinks);
        let mut sinks = Vec::with_capacity(num_sinks);
        let mut senders = Vec::with_capacity(num_sinks);

        for i in 0..num_sinks {
            let sink_node = nodes[i];
            let source_node = nodes[i + num_sinks];
            let sink_addr = SocketAddrV4::new(addresses[i], port);
            let source_addr = SocketAddrV4::new(addresses[i + num_sinks], SENDER_PORT);

            flows.push(Flow {
                id: i,
                source: source_node,
                sink: sink_node,
                address: addresses[i],
                port,
            });
            sinks.push(PacketSink::bind(sink_node, sink_addr));
            senders.push(OnOffSender::new(
                source_node,
                source_addr,
                sink_addr,
                profile,
                SimTime::ZERO,
                stop,
            ));
        }

        Ok(TrafficPlan { flows, sinks, senders })
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn sinks(&self) -> &[PacketSink] {
        &self.sinks
    }

    pub fn senders(&self) -> &[OnOffSender] {
        &self.senders
    }

    pub fn sink_mut(&mut self, flow: usize) -> Option<&mut PacketSink> {
        self.sinks.get_mut(flow)
    }

    pub fn sender_mut(&mut self, flow: usize) -> Option<&mut OnOffSender> {
        self.senders.get_mut(flow)
    }

    /// Flow whose sink is bound to `node:port`.
    pub fn sink_for(&self, node: NodeId, port: u16) -> Option<usize> {
        self.sinks
            .iter()
            .position(|s| s.node() == node && s.local().port() == port)
    }

    /// Delay every sender's start by a uniform random offset in `[0, max)`.
    pub fn jitter_starts<R: Rng + ?Sized>(&mut self, rng: &mut R, max: Duration) {
        if max.is_zero() {
            return;
        }
        for sender in &mut self.senders {
            let offset = Duration::from_secs_f64(rng.gen_range(0.0..max.as_secs_f64()));
            sender.set_start_time(SimTime::ZERO + offset);
        }
    }

    /// Close every sink. Returns the number of unread datagrams discarded.
    pub fn close_sinks(&mut self) -> usize {
        self.sinks.iter_mut().map(|s| s.close()).sum()
    }
}
