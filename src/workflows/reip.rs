//! Re-IP a set of nodes (§4.8 call sites #1/#2; scenario S5).

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::ops::{ReIp, ReIpEntry};
use crate::topology::Host;
use crate::workflows::WorkflowReport;
use chrono::Utc;

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    hosts: Vec<Host>,
    entries: Vec<ReIpEntry>,
    primaries_with_latest_catalog: usize,
    total_primaries: usize,
) -> (Result<()>, WorkflowReport) {
    let report = WorkflowReport::start("reip", Utc::now());
    let operations: Vec<Box<dyn crate::operation::Operation>> = vec![Box::new(ReIp::new(
        hosts,
        entries,
        primaries_with_latest_catalog,
        total_primaries,
    ))];
    let result = engine.run(ctx, operations).await;
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}
