//! The shared execution context (C4 §3.4): a workflow's blackboard, owned
//! by the engine and borrowed mutably by whichever operation is currently
//! running. Because the engine is single-threaded between operations (§9
//! design note), no field ever needs a lock — the borrow checker already
//! enforces "written by at most one operation at a time" by construction.

use crate::dispatcher::Dispatcher;
use crate::ops::SandboxBuckets;
use crate::topology::{Host, Topology, MAIN_CLUSTER};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A network profile entry (`broadcast`, `netmask`, ...) used to rewrite
/// addresses during re-IP.
#[derive(Debug, Clone, Default)]
pub struct NetworkProfile {
    pub broadcast: String,
    pub netmask: String,
}

/// The per-run blackboard threaded through every operation in an engine
/// run. See §3.4 for the authoritative field list; invariant: a field read
/// by operation *N* must have been written by some predecessor operation in
/// the same run, or by the workflow that constructed the context.
pub struct ExecutionContext {
    /// Shared dispatcher handle used by every operation's `execute` phase.
    pub dispatcher: Arc<Dispatcher>,

    /// Sorted hosts observed UP by the most recent topology fetch.
    pub up_hosts: Vec<Host>,
    /// Subset of `up_hosts` that are compute-only nodes.
    pub compute_hosts: Vec<Host>,
    /// `up-host -> subcluster name`.
    pub up_sc_info: BTreeMap<String, String>,
    /// `up-host -> sandbox name` (empty string = main cluster).
    pub up_hosts_to_sandboxes: BTreeMap<String, String>,

    /// Hosts whose catalog-editor view reports the latest catalog epoch.
    pub hosts_with_latest_catalog: Vec<Host>,
    /// The subset of those that are also primaries.
    pub primary_hosts_with_latest_catalog: Vec<Host>,

    /// Catalog snapshot read directly from the NMA catalog editor, used
    /// when the database itself is DOWN.
    pub nma_vdatabase: Option<Topology>,

    /// `host -> network profile`, used to rewrite addresses during re-IP.
    pub network_profiles: BTreeMap<String, NetworkProfile>,

    /// `node-name -> argv`, retrieved from a running primary.
    pub startup_command_map: BTreeMap<String, Vec<String>>,

    /// Diagnostic lists populated by pre-flight/health operations.
    pub unreachable_hosts: Vec<Host>,
    pub hosts_with_wrong_auth: Vec<Host>,
    pub hosts_with_vcluster_server_pid: Vec<Host>,

    /// The target sandbox (or `MAIN_CLUSTER`) this workflow is scoped to.
    pub sandbox: String,

    /// The live topology view, when one has been fetched from the running
    /// database (as opposed to only the NMA catalog editor).
    pub topology: Option<Topology>,

    /// Workflow output pointers: populated by whichever operation produces
    /// them, read by the workflow after the engine returns.
    pub restore_points: Vec<String>,
    pub active_sessions: Vec<String>,
    pub draining_hosts: Vec<Host>,

    /// Set once a `DegradeKSafety` run has lowered design-k-safety to zero
    /// ahead of a node removal that would otherwise drop below the
    /// k-safety threshold (§4.8 call site #3, P4).
    pub k_safety_degraded: bool,

    /// The sandbox-membership buckets most recently computed by
    /// `CheckSubclusterSandboxing::prepare`, published here so downstream
    /// operations in the same run don't need a handle back to the boxed
    /// operation that produced them.
    pub sandbox_buckets: Option<SandboxBuckets>,
}

impl ExecutionContext {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            up_hosts: Vec::new(),
            compute_hosts: Vec::new(),
            up_sc_info: BTreeMap::new(),
            up_hosts_to_sandboxes: BTreeMap::new(),
            hosts_with_latest_catalog: Vec::new(),
            primary_hosts_with_latest_catalog: Vec::new(),
            nma_vdatabase: None,
            network_profiles: BTreeMap::new(),
            startup_command_map: BTreeMap::new(),
            unreachable_hosts: Vec::new(),
            hosts_with_wrong_auth: Vec::new(),
            hosts_with_vcluster_server_pid: Vec::new(),
            sandbox: MAIN_CLUSTER.to_string(),
            topology: None,
            restore_points: Vec::new(),
            active_sessions: Vec::new(),
            draining_hosts: Vec::new(),
            k_safety_degraded: false,
            sandbox_buckets: None,
        }
    }

    pub fn with_sandbox(mut self, sandbox: impl Into<String>) -> Self {
        self.sandbox = sandbox.into();
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.up_hosts = topology.up_hosts();
        self.up_sc_info = topology.up_host_subclusters();
        self.up_hosts_to_sandboxes = topology.up_host_sandboxes();
        self.topology = Some(topology);
        self
    }

    /// Record a host as unreachable, deduplicating.
    pub fn mark_unreachable(&mut self, host: Host) {
        if !self.unreachable_hosts.contains(&host) {
            self.unreachable_hosts.push(host);
        }
    }

    pub fn is_unreachable(&self, host: &Host) -> bool {
        self.unreachable_hosts.contains(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{Node, NodeState};

    fn topology_fixture() -> Topology {
        Topology {
            nodes: vec![Node {
                name: "v_db_node0001".to_string(),
                host: Host::parse("10.0.0.1").unwrap(),
                subcluster: "default".to_string(),
                sandbox: MAIN_CLUSTER.to_string(),
                is_primary: true,
                state: NodeState::Up,
                catalog_path: "/catalog".to_string(),
                storage_locations: vec![],
                depot_path: None,
                version: None,
            }],
            subclusters: vec![],
        }
    }

    #[test]
    fn with_topology_populates_derived_fields() {
        let ctx = ExecutionContext::new(Arc::new(Dispatcher::new())).with_topology(topology_fixture());
        assert_eq!(ctx.up_hosts.len(), 1);
        assert_eq!(
            ctx.up_sc_info.get("10.0.0.1").map(String::as_str),
            Some("default")
        );
    }

    #[test]
    fn mark_unreachable_deduplicates() {
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        let host = Host::parse("10.0.0.1").unwrap();
        ctx.mark_unreachable(host.clone());
        ctx.mark_unreachable(host.clone());
        assert_eq!(ctx.unreachable_hosts.len(), 1);
    }
}
