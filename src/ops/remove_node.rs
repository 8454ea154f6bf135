//! Remove one or more nodes from the cluster (§4.8 call site #3; scenario
//! S6). Grounded on the fan-out-to-all shape; the k-safety precondition is
//! checked entirely from the topology already in hand, so a doomed removal
//! never issues a single HTTP request.

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::{Host, NodeState, Topology};
use async_trait::async_trait;

/// Whether dropping `nodes_to_remove` would leave fewer primaries than
/// `design_k_safety` requires (§4.8 call site #3, P4) — distinct from the
/// liveness/quorum precondition in [`RemoveNode::prepare`]: a cluster can be
/// fully healthy and still have its redundancy reduced below the declared
/// k-safety level by a removal. `design_k_safety == 0` never triggers a
/// degrade, since zero k-safety has no redundancy left to protect.
pub fn needs_k_safety_degrade(topology: &Topology, nodes_to_remove: &[Host], design_k_safety: u32) -> bool {
    if design_k_safety == 0 {
        return false;
    }
    let remaining_primaries = topology
        .nodes
        .iter()
        .filter(|n| n.is_primary && !nodes_to_remove.contains(&n.host))
        .count();
    let min_required = 2 * design_k_safety as usize + 1;
    remaining_primaries < min_required
}

pub struct RemoveNode {
    base: OperationBase,
    nodes_to_remove: Vec<Host>,
}

impl RemoveNode {
    pub fn new(hosts: Vec<Host>, nodes_to_remove: Vec<Host>) -> Self {
        let mut base = OperationBase::new(
            "remove_node",
            "removing node(s) from the cluster",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base, nodes_to_remove }
    }
}

#[async_trait]
impl Operation for RemoveNode {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        if let Some(topology) = &ctx.topology {
            // Every primary that survives the removal must already be UP
            // or STANDBY; dropping one more host on top of an existing
            // outage would take the cluster below k-safety.
            let surviving_primary_down = topology.nodes.iter().any(|n| {
                n.is_primary
                    && !self.nodes_to_remove.contains(&n.host)
                    && !matches!(n.state, NodeState::Up | NodeState::Standby)
            });
            if surviving_primary_down {
                return Err(OperationError::Domain {
                    operation: self.base.name.clone(),
                    message: "all nodes must be up or standby".to_string(),
                });
            }
        }

        for host in self.nodes_to_remove.clone() {
            let body = serde_json::json!({ "node_to_remove": host.to_string() });
            let request = Request::nma(Method::Post, nma::DIRECTORIES_DELETE).with_body(body);
            self.base.cluster_request.set_request(host.to_string(), request);
        }
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let mut failures: Vec<(String, OperationError)> = Vec::new();
        for (host, result) in &self.base.cluster_request.results {
            if result.is_unauthorized() {
                return Err(result.error.clone().unwrap());
            }
            if !result.is_passing() {
                failures.push((host.clone(), result.error.clone().unwrap()));
            }
        }
        if !failures.is_empty() {
            return Err(OperationError::join(self.base.name.clone(), failures));
        }
        Ok(())
    }
}
