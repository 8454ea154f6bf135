//! Check for a leftover `vcluster-server` PID file on each host (§4.3
//! fan-out-to-all + join; scenario S1).
//!
//! Grounded on the fan-out-to-all shape: every host is probed independently
//! and a transport failure on one host does not prevent the hosts that did
//! answer from being recorded in the context before the joined error is
//! returned (S1's "error *and* ctx is still populated" behaviour).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct VclusterServerHealth {
    vcluster_server_pid_file_exists: String,
}

pub struct CheckVclusterServerPid {
    base: OperationBase,
}

impl CheckVclusterServerPid {
    pub fn new(hosts: Vec<Host>) -> Self {
        let mut base = OperationBase::new(
            "check_vcluster_server_pid",
            "checking for a leftover vcluster-server pid file",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base }
    }
}

#[async_trait]
impl Operation for CheckVclusterServerPid {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        self.base
            .register_hosts(|_| Request::nma(Method::Get, nma::HEALTH_VCLUSTER_SERVER));
        Ok(())
    }

    async fn process_result(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let mut failures = Vec::new();

        for (host, result) in &self.base.cluster_request.results {
            if !result.is_passing() {
                failures.push((host.clone(), result.error.clone().unwrap()));
                continue;
            }
            let parsed: VclusterServerHealth = serde_json::from_str(&result.body).map_err(|e| {
                OperationError::Protocol {
                    host: host.clone(),
                    message: format!("failed to parse vcluster-server health body: {e}"),
                }
            })?;
            if parsed.vcluster_server_pid_file_exists == "true" {
                ctx.hosts_with_vcluster_server_pid.push(Host::parse(host)?);
            }
        }

        if !failures.is_empty() {
            return Err(OperationError::join(self.base.name.clone(), failures));
        }
        Ok(())
    }
}
