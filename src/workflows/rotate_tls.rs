//! Rotate the NMA's HTTPS certificate across the cluster, then poll until
//! every host's HTTPS-DB service answers again (§7 error kind 3; scenario
//! S4 covers the tolerant-poll half of this in isolation).

use crate::context::ExecutionContext;
use crate::engine::OperationEngine;
use crate::error::Result;
use crate::ops::{PollHttpsHealth, RotateTlsCerts};
use crate::topology::Host;
use crate::workflows::WorkflowReport;
use chrono::Utc;
use std::time::Duration;

pub async fn run(
    engine: &OperationEngine,
    ctx: &mut ExecutionContext,
    hosts: Vec<Host>,
    key_pem: String,
    cert_pem: String,
    ca_cert_pem: Option<String>,
    poll_timeout: Duration,
) -> (Result<()>, WorkflowReport) {
    let report = WorkflowReport::start("rotate_tls", Utc::now());
    let operations: Vec<Box<dyn crate::operation::Operation>> = vec![
        Box::new(RotateTlsCerts::new(hosts.clone(), key_pem, cert_pem, ca_cert_pem)),
        Box::new(PollHttpsHealth::new(hosts, poll_timeout)),
    ];
    let result = engine.run(ctx, operations).await;
    let report = report.finish(Utc::now(), result.is_ok());
    (result, report)
}
