//! In-memory view of the database cluster (C7 §3.5).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel sandbox name meaning "the main cluster, not a sandbox" (§3.5,
/// glossary). Using an empty string (rather than an `Option`) matches the
/// wire representation the NMA/HTTPS services use and keeps
/// `upHostsToSandboxes`-style maps total functions rather than partial ones.
pub const MAIN_CLUSTER: &str = "";

/// A resolved network address. Construction is the only place address
/// literals are accepted; P7 requires every host that reaches a `Request`
/// to have passed through here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Host(String);

impl Host {
    /// Parse and normalise a host address, rejecting anything that isn't an
    /// IPv4 or IPv6 literal (P7: no DNS names are allowed to enter the
    /// topology model).
    pub fn parse(addr: &str) -> Result<Self, crate::error::OperationError> {
        addr.parse::<std::net::IpAddr>()
            .map(|ip| Host(ip.to_string()))
            .map_err(|_| {
                crate::error::OperationError::Validation(format!(
                    "host address '{addr}' is not a resolved IPv4 or IPv6 literal"
                ))
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Up,
    Down,
    Compute,
    Standby,
    Unknown,
}

impl NodeState {
    pub fn from_wire(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "UP" => NodeState::Up,
            "DOWN" => NodeState::Down,
            "COMPUTE" => NodeState::Compute,
            "STANDBY" => NodeState::Standby,
            _ => NodeState::Unknown,
        }
    }
}

/// A declared cluster node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub host: Host,
    pub subcluster: String,
    /// Empty string (`MAIN_CLUSTER`) if this node belongs to the main
    /// cluster rather than a sandbox.
    pub sandbox: String,
    pub is_primary: bool,
    pub state: NodeState,
    pub catalog_path: String,
    pub storage_locations: Vec<String>,
    pub depot_path: Option<String>,
    pub version: Option<String>,
}

impl Node {
    pub fn is_up(&self) -> bool {
        matches!(self.state, NodeState::Up)
    }

    pub fn in_sandbox(&self, sandbox: &str) -> bool {
        self.sandbox == sandbox
    }
}

/// A declared node whose address is still the re-IP placeholder.
pub const UNBOUND_ADDRESS: &str = "0.0.0.0";

pub fn is_unbound(node: &Node) -> bool {
    node.host.as_str() == UNBOUND_ADDRESS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcluster {
    pub name: String,
    pub is_default: bool,
    pub is_secondary: bool,
    pub control_set_size: u32,
    pub sandbox: String,
}

/// The authoritative topology view for one workflow invocation. Owned by
/// the workflow that fetched it; operations borrow it through the
/// execution context. Mutated only by explicit fetches from the running
/// database or the NMA catalog editor (§3.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub subclusters: Vec<Subcluster>,
}

impl Topology {
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn nodes_in_sandbox(&self, sandbox: &str) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.in_sandbox(sandbox)).collect()
    }

    pub fn up_hosts(&self) -> Vec<Host> {
        let mut hosts: Vec<Host> = self
            .nodes
            .iter()
            .filter(|n| n.is_up())
            .map(|n| n.host.clone())
            .collect();
        hosts.sort();
        hosts.dedup();
        hosts
    }

    pub fn up_hosts_in_sandbox(&self, sandbox: &str) -> Vec<Host> {
        let mut hosts: Vec<Host> = self
            .nodes
            .iter()
            .filter(|n| n.is_up() && n.in_sandbox(sandbox))
            .map(|n| n.host.clone())
            .collect();
        hosts.sort();
        hosts.dedup();
        hosts
    }

    pub fn primary_count(&self, sandbox: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_primary && n.in_sandbox(sandbox))
            .count()
    }

    pub fn up_primary_count(&self, sandbox: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_primary && n.is_up() && n.in_sandbox(sandbox))
            .count()
    }

    /// Map `up-host -> subcluster name` (`upScInfo`, §3.4).
    pub fn up_host_subclusters(&self) -> BTreeMap<String, String> {
        self.nodes
            .iter()
            .filter(|n| n.is_up())
            .map(|n| (n.host.to_string(), n.subcluster.clone()))
            .collect()
    }

    /// Map `up-host -> sandbox name` (`upHostsToSandboxes`, §3.4).
    pub fn up_host_sandboxes(&self) -> BTreeMap<String, String> {
        self.nodes
            .iter()
            .filter(|n| n.is_up())
            .map(|n| (n.host.to_string(), n.sandbox.clone()))
            .collect()
    }

    /// Choose an "initiator" for the given sandbox/cluster (§4.9): prefer
    /// an up primary in the target group, fall back to any up node in that
    /// group, error if none exists.
    pub fn choose_initiator(&self, sandbox: &str) -> crate::error::Result<Host> {
        if let Some(node) = self
            .nodes
            .iter()
            .find(|n| n.is_primary && n.is_up() && n.in_sandbox(sandbox))
        {
            return Ok(node.host.clone());
        }
        if let Some(node) = self.nodes.iter().find(|n| n.is_up() && n.in_sandbox(sandbox)) {
            return Ok(node.host.clone());
        }
        Err(crate::error::OperationError::Validation(format!(
            "no UP node available to act as initiator for group '{sandbox}'"
        )))
    }
}

/// `hasQuorum(h, p) := h >= floor(p/2) + 1` (§3.6, §4.8).
pub fn has_quorum(healthy_primaries: usize, total_primaries: usize) -> bool {
    healthy_primaries >= total_primaries / 2 + 1
}

/// The number of healthy primaries required to retain quorum over
/// `total_primaries`.
pub fn quorum_threshold(total_primaries: usize) -> usize {
    total_primaries / 2 + 1
}
