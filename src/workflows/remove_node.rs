//! Remove one or more nodes from the cluster (§4.8 call site #3; scenario
//! S6). Two independent k-safety checks guard a removal: the liveness/quorum
//! precondition in [`RemoveNode::prepare`] rejects a removal outright when a
//! surviving primary is already down, while [`build_operations`] separately
//! decides, via [`needs_k_safety_degrade`], whether the removal would merely
//! *reduce* redundancy below a declared k-safety target — in which case a
//! [`DegradeKSafety`] step runs first rather than rejecting the removal.
//! Both checks run against the topology already in hand, so a doomed or
//! redundancy-reducing removal is caught before the engine ever dispatches a
//! request; callers that also want a fresh reachability probe should run
//! [`crate::ops::CheckNmaHealth`] as an earlier step of their own pipeline.

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::operation::Operation;
use crate::ops::remove_node::needs_k_safety_degrade;
use crate::ops::{DegradeKSafety, RemoveNode};
use crate::topology::Host;
use crate::workflows::WorkflowReport;
use chrono::Utc;

/// Build the operation list for a removal: a `DegradeKSafety` step is
/// prepended only when the removal would drop the cluster's primary count
/// below what `design_k_safety` requires (§4.8 call site #3, P4) — the
/// degrade must run and succeed before the removal is ever attempted.
/// `design_k_safety` is typically `0` for callers that don't track a
/// k-safety target, in which case a degrade step is never needed.
pub fn build_operations(
    ctx: &ExecutionContext,
    all_hosts: Vec<Host>,
    nodes_to_remove: Vec<Host>,
    design_k_safety: u32,
) -> Vec<Box<dyn Operation>> {
    let mut operations: Vec<Box<dyn Operation>> = Vec::new();
    if let Some(topology) = &ctx.topology {
        if needs_k_safety_degrade(topology, &nodes_to_remove, design_k_safety) {
            operations.push(Box::new(DegradeKSafety::new()));
        }
    }
    operations.push(Box::new(RemoveNode::new(all_hosts, nodes_to_remove)));
    operations
}

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    all_hosts: Vec<Host>,
    nodes_to_remove: Vec<Host>,
    design_k_safety: u32,
) -> (Result<()>, WorkflowReport) {
    let report = WorkflowReport::start("remove_node", Utc::now());
    let operations = build_operations(ctx, all_hosts, nodes_to_remove, design_k_safety);
    let result = engine.run(ctx, operations).await;
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}
