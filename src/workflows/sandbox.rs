//! Classify hosts by sandbox membership ahead of a sandbox/unsandbox
//! conversion (§4.3 host-selection-by-topology).

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::ops::{CheckSubclusterSandboxing, SandboxBuckets};
use crate::topology::Host;
use crate::workflows::WorkflowReport;
use chrono::Utc;

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    hosts: Vec<Host>,
    target_sandbox: impl Into<String>,
) -> (Result<SandboxBuckets>, WorkflowReport) {
    let report = WorkflowReport::start("sandbox_classify", Utc::now());
    let operations: Vec<Box<dyn crate::operation::Operation>> =
        vec![Box::new(CheckSubclusterSandboxing::new(hosts, target_sandbox))];
    let run_result = engine.run(ctx, operations).await;
    let result = run_result.map(|()| ctx.sandbox_buckets.clone().unwrap_or_default());
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::topology::{Node, NodeState, Topology, MAIN_CLUSTER};
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
    async fn classifies_hosts_into_buckets() {
        let topology = Topology {
            nodes: vec![node("10.0.0.1", MAIN_CLUSTER), node("10.0.0.2", "sb1")],
            subclusters: vec![],
        };
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new())).with_topology(topology);
        let engine = OperationEngine::new();
        let hosts = vec![Host::parse("10.0.0.1").unwrap(), Host::parse("10.0.0.2").unwrap()];
        let (result, report) = run(&engine, &mut ctx, hosts, "sb1").await;
        let buckets = result.unwrap();
        assert_eq!(buckets.main_cluster, vec![Host::parse("10.0.0.1").unwrap()]);
        assert_eq!(buckets.existing_sandboxed, vec![Host::parse("10.0.0.2").unwrap()]);
        assert!(report.succeeded);
    }
}
