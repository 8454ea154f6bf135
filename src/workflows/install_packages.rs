//! Install default packages against the cluster's chosen initiator (§4.3
//! initiator-only).

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::ops::InstallPackages;
use crate::workflows::WorkflowReport;
use chrono::Utc;

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    force_reinstall: bool,
) -> (Result<()>, WorkflowReport) {
    let report = WorkflowReport::start("install_packages", Utc::now());
    let operations: Vec<Box<dyn crate::operation::Operation>> =
        vec![Box::new(InstallPackages::new(force_reinstall))];
    let result = engine.run(ctx, operations).await;
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}
