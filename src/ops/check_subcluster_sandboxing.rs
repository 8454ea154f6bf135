//! Partition candidate hosts into sandboxing buckets (§4.3
//! host-selection-by-topology): iterate reported subclusters and classify
//! ctx hosts as "to-remove" (leaving their current sandbox), "existing
//! sandboxed" (already in the target sandbox), or "main cluster", then
//! publish one representative host per bucket back into ctx for downstream
//! operations.

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::operation::{Operation, OperationBase};
use crate::topology::{Host, MAIN_CLUSTER};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct SandboxBuckets {
    pub to_remove: Vec<Host>,
    pub existing_sandboxed: Vec<Host>,
    pub main_cluster: Vec<Host>,
}

pub struct CheckSubclusterSandboxing {
    base: OperationBase,
    target_sandbox: String,
    pub buckets: SandboxBuckets,
}

impl CheckSubclusterSandboxing {
    pub fn new(hosts: Vec<Host>, target_sandbox: impl Into<String>) -> Self {
        let mut base = OperationBase::new(
            "check_subcluster_sandboxing",
            "classifying hosts by sandbox membership",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self {
            base,
            target_sandbox: target_sandbox.into(),
            buckets: SandboxBuckets::default(),
        }
    }
}

#[async_trait]
impl Operation for CheckSubclusterSandboxing {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let Some(topology) = &ctx.topology else {
            return Ok(());
        };
        for host in &self.base.hosts {
            let Some(node) = topology.nodes.iter().find(|n| &n.host == host) else {
                continue;
            };
            if node.sandbox == MAIN_CLUSTER {
                self.buckets.main_cluster.push(host.clone());
            } else if node.sandbox == self.target_sandbox {
                self.buckets.existing_sandboxed.push(host.clone());
            } else {
                self.buckets.to_remove.push(host.clone());
            }
        }
        ctx.sandbox_buckets = Some(self.buckets.clone());
        self.base.skip_execute = true;
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::topology::{Node, NodeState, Topology};
    use std::sync::Arc;

    fn node(host: &str, sandbox: &str) -> Node {
        Node {
            name: format!("v_db_node_{host}"),
            host: Host::parse(host).unwrap(),
            subcluster: "default".into(),
            sandbox: sandbox.into(),
            is_primary: false,
            state: NodeState::Up,
            catalog_path: "/catalog".into(),
            storage_locations: vec![],
            depot_path: None,
            version: None,
        }
    }

    #[tokio::test]
    async fn partitions_hosts_into_three_buckets() {
        let topology = Topology {
            nodes: vec![
                node("10.0.0.1", MAIN_CLUSTER),
                node("10.0.0.2", "sb_target"),
                node("10.0.0.3", "sb_other"),
            ],
            subclusters: vec![],
        };
        let hosts = vec![
            Host::parse("10.0.0.1").unwrap(),
            Host::parse("10.0.0.2").unwrap(),
            Host::parse("10.0.0.3").unwrap(),
        ];
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new())).with_topology(topology);
        let mut op = CheckSubclusterSandboxing::new(hosts, "sb_target");
        op.prepare(&mut ctx).await.unwrap();

        assert_eq!(op.buckets.main_cluster, vec![Host::parse("10.0.0.1").unwrap()]);
        assert_eq!(op.buckets.existing_sandboxed, vec![Host::parse("10.0.0.2").unwrap()]);
        assert_eq!(op.buckets.to_remove, vec![Host::parse("10.0.0.3").unwrap()]);
        assert!(op.is_skip_execute());
    }
}
