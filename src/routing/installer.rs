//! Routing protocol installation.
//!
//! Each protocol is bound to the node set through one of two paths. OLSR, AODV
//! and DSDV go through a single-entry routing list installed together with the
//! internet stack. DSR needs the bare internet stack first and its own agent
//! attached afterwards.

use super::types::{InstallPath, ListRouting, ProtocolChoice, LIST_ROUTING_PRIORITY};
use crate::sim::NodeId;
use log::info;

/// Errors raised by the engine while binding a stack to nodes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InstallError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} already has an internet stack")]
    AlreadyInstalled(NodeId),
    #[error("node {0} has no internet stack to attach a routing agent to")]
    MissingInternetStack(NodeId),
    #[error("no nodes to install on")]
    NoNodes,
}

/// The engine-side hooks a routing installation needs.
pub trait RoutingStack {
    /// Install the internet stack on `nodes`, optionally with a routing list.
    fn install_internet(&mut self, nodes: &[NodeId], routing: Option<&ListRouting>) -> Result<(), InstallError>;

    /// Attach the DSR routing agent to nodes that already carry an internet stack.
    fn install_dsr(&mut self, nodes: &[NodeId]) -> Result<(), InstallError>;
}

/// Record of the routing implementation bound to the nodes of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingHandle {
    protocol: ProtocolChoice,
    path: InstallPath,
    nodes: Vec<NodeId>,
}

impl RoutingHandle {
    pub fn protocol(&self) -> ProtocolChoice {
        self.protocol
    }

    pub fn path(&self) -> InstallPath {
        self.path
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

/// Bind `protocol` to every node in `nodes`.
pub fn install<S>(protocol: ProtocolChoice, stack: &mut S, nodes: &[NodeId]) -> Result<RoutingHandle, InstallError>
where
    S: RoutingStack + ?Sized,
{
    if nodes.is_empty() {
        return Err(InstallError::NoNodes);
    }

    match protocol {
        ProtocolChoice::Olsr | ProtocolChoice::Aodv | ProtocolChoice::Dsdv => {
            install_list_routing(protocol, stack, nodes)?
        }
        ProtocolChoice::Dsr => install_dsr_two_step(stack, nodes)?,
    }

    Ok(RoutingHandle {
        protocol,
        path: protocol.install_path(),
        nodes: nodes.to_vec(),
    })
}

fn install_list_routing<S>(protocol: ProtocolChoice, stack: &mut S, nodes: &[NodeId]) -> Result<(), InstallError>
where
    S: RoutingStack + ?Sized,
{
    let mut list = ListRouting::new();
    list.add(protocol, LIST_ROUTING_PRIORITY);
    stack.install_internet(nodes, Some(&list))?;
    info!(
        "Installed {} on {} nodes via list routing (priority {})",
        protocol,
        nodes.len(),
        LIST_ROUTING_PRIORITY
    );
    Ok(())
}

fn install_dsr_two_step<S>(stack: &mut S, nodes: &[NodeId]) -> Result<(), InstallError>
where
    S: RoutingStack + ?Sized,
{
    stack.install_internet(nodes, None)?;
    stack.install_dsr(nodes)?;
    info!("Installed internet stack and DSR agent on {} nodes", nodes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call so the install path can be asserted.
    #[derive(Default)]
    struct RecordingStack {
        calls: Vec<String>,
    }

    impl RoutingStack for RecordingStack {
        fn install_internet(&mut self, nodes: &[NodeId], routing: Option<&ListRouting>) -> Result<(), InstallError> {
            let call = match routing {
                Some(list) => {
                    let entries: Vec<String> = list
                        .entries()
                        .iter()
                        .map(|(p, prio)| format!("{}@{}", p, prio))
                        .collect();
                    format!("internet[{}] list={}", nodes.len(), entries.join(","))
                }
                None => format!("internet[{}]", nodes.len()),
            };
            self.calls.push(call);
            Ok(())
        }

        fn install_dsr(&mut self, nodes: &[NodeId]) -> Result<(), InstallError> {
            self.calls.push(format!("dsr[{}]", nodes.len()));
            Ok(())
        }
    }

    #[test]
    fn test_list_routing_protocols_install_in_one_step() {
        for protocol in [ProtocolChoice::Olsr, ProtocolChoice::Aodv, ProtocolChoice::Dsdv] {
            let mut stack = RecordingStack::default();
            let handle = install(protocol, &mut stack, &[0, 1, 2]).unwrap();

            assert_eq!(handle.protocol(), protocol);
            assert_eq!(handle.path(), InstallPath::ListRouting);
            assert_eq!(handle.nodes(), &[0, 1, 2]);
            assert_eq!(stack.calls, vec![format!("internet[3] list={}@100", protocol)]);
        }
    }

    #[test]
    fn test_dsr_installs_in_two_steps() {
        let mut stack = RecordingStack::default();
        let handle = install(ProtocolChoice::Dsr, &mut stack, &[0, 1, 2, 3]).unwrap();

        assert_eq!(handle.path(), InstallPath::TwoStep);
        assert_eq!(stack.calls, vec!["internet[4]".to_string(), "dsr[4]".to_string()]);
    }

    #[test]
    fn test_empty_node_set_is_rejected() {
        let mut stack = RecordingStack::default();
        assert_eq!(install(ProtocolChoice::Aodv, &mut stack, &[]), Err(InstallError::NoNodes));
        assert!(stack.calls.is_empty());
    }
}
