//! Promote a secondary subcluster to primary (§4.3 initiator-only; §4.9).

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::ops::PromoteSubcluster;
use crate::workflows::WorkflowReport;
use chrono::Utc;

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    subcluster_name: impl Into<String>,
) -> (Result<()>, WorkflowReport) {
    let report = WorkflowReport::start("promote_subcluster", Utc::now());
    let operations: Vec<Box<dyn crate::operation::Operation>> =
        vec![Box::new(PromoteSubcluster::new(subcluster_name))];
    let result = engine.run(ctx, operations).await;
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}
