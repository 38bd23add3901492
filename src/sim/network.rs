//! Ideal ad-hoc network.
//!
//! Stand-in for the radio, MAC and routing layers of a full network simulator:
//! every datagram between two nodes that carry an internet stack arrives intact
//! after a fixed propagation delay. Routing installations are recorded per node
//! but do not influence delivery.

use super::time::SimTime;
use crate::routing::{InstallError, ListRouting, RoutingStack};
use color_eyre::eyre::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;

/// Engine-assigned node identifier (index in creation order).
pub type NodeId = u32;

/// A UDP datagram in flight. Only the payload length is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram {
    pub source: SocketAddrV4,
    pub destination: SocketAddrV4,
    pub len: u32,
}

/// Box the initial node positions are drawn from, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementBox {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for PlacementBox {
    fn default() -> Self {
        PlacementBox {
            x: 2000.0,
            y: 2000.0,
            z: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Default)]
struct NodeState {
    address: Option<Ipv4Addr>,
    position: Position,
    internet: bool,
    routing: Option<ListRouting>,
    dsr: bool,
}

pub struct AdhocNetwork {
    nodes: Vec<NodeState>,
    propagation_delay: Duration,
    delivered: u64,
    dropped: u64,
}

impl AdhocNetwork {
    pub fn new(count: usize, propagation_delay: Duration) -> Self {
        AdhocNetwork {
            nodes: vec![NodeState::default(); count],
            propagation_delay,
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        (0..self.nodes.len() as NodeId).collect()
    }

    fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(id as usize)
    }

    /// Draw a uniform random position inside `area` for every node.
    pub fn place_nodes<R: Rng + ?Sized>(&mut self, rng: &mut R, area: &PlacementBox) {
        for node in &mut self.nodes {
            node.position = Position {
                x: rng.gen_range(0.0..=area.x),
                y: rng.gen_range(0.0..=area.y),
                z: rng.gen_range(0.0..=area.z),
            };
        }
    }

    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.node(id).map(|n| n.position)
    }

    /// Assign addresses to nodes in node order.
    pub fn assign_addresses<I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        for (node, address) in self.nodes.iter_mut().zip(addresses) {
            node.address = Some(address);
        }
    }

    pub fn address(&self, id: NodeId) -> Option<Ipv4Addr> {
        self.node(id).and_then(|n| n.address)
    }

    /// Find the node that owns `address`.
    pub fn resolve(&self, address: Ipv4Addr) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.address == Some(address))
            .map(|i| i as NodeId)
    }

    pub fn has_internet(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |n| n.internet)
    }

    pub fn routing_list(&self, id: NodeId) -> Option<&ListRouting> {
        self.node(id).and_then(|n| n.routing.as_ref())
    }

    pub fn has_dsr(&self, id: NodeId) -> bool {
        self.node(id).map_or(false, |n| n.dsr)
    }

    /// Hand a datagram to the channel.
    ///
    /// Returns the receiving node and the arrival time, or `None` when either
    /// end has no internet stack or the destination address is unknown.
    pub fn transmit(&mut self, datagram: &Datagram, now: SimTime) -> Option<(NodeId, SimTime)> {
        let source = self.resolve(*datagram.source.ip());
        let destination = self.resolve(*datagram.destination.ip());
        match (source, destination) {
            (Some(src), Some(dst)) if self.has_internet(src) && self.has_internet(dst) => {
                self.delivered += 1;
                Some((dst, now + self.propagation_delay))
            }
            _ => {
                self.dropped += 1;
                log::debug!(
                    "{} dropped datagram {} -> {}: no route",
                    now,
                    datagram.source,
                    datagram.destination
                );
                None
            }
        }
    }

    /// Datagrams accepted by the channel so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Write node positions in the ns-3 ascii mobility trace format.
    ///
    /// Nodes do not move in this network, so each node gets a single entry at
    /// time zero.
    pub fn write_mobility_trace(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create mobility trace '{}'", path.display()))?;
        let mut out = BufWriter::new(file);
        for id in self.node_ids() {
            let pos = self.position(id).unwrap_or_default();
            writeln!(
                out,
                "now=+0.0ns node={} pos={:.3}:{:.3}:{:.3} vel=0:0:0",
                id, pos.x, pos.y, pos.z
            )?;
        }
        out.flush()
            .wrap_err_with(|| format!("Failed to write mobility trace '{}'", path.display()))?;
        log::info!("Mobility trace written to {}", path.display());
        Ok(())
    }

    fn check_nodes(&self, nodes: &[NodeId]) -> Result<(), InstallError> {
        match nodes.iter().find(|&&id| self.node(id).is_none()) {
            Some(&id) => Err(InstallError::UnknownNode(id)),
            None => Ok(()),
        }
    }
}

impl RoutingStack for AdhocNetwork {
    fn install_internet(&mut self, nodes: &[NodeId], routing: Option<&ListRouting>) -> Result<(), InstallError> {
        self.check_nodes(nodes)?;
        if let Some(&id) = nodes.iter().find(|&&id| self.has_internet(id)) {
            return Err(InstallError::AlreadyInstalled(id));
        }
        for &id in nodes {
            let node = &mut self.nodes[id as usize];
            node.internet = true;
            node.routing = routing.cloned();
        }
        Ok(())
    }

    fn install_dsr(&mut self, nodes: &[NodeId]) -> Result<(), InstallError> {
        self.check_nodes(nodes)?;
        if let Some(&id) = nodes.iter().find(|&&id| !self.has_internet(id)) {
            return Err(InstallError::MissingInternetStack(id));
        }
        for &id in nodes {
            self.nodes[id as usize].dsr = true;
        }
        Ok(())
    }
}
