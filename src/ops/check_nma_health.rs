//! Pre-flight NMA reachability probe (§4.3 "fan-out-to-all"; §7 error kind
//! 2). Grounded on the fan-out-to-all shape and on `topology::has_quorum`
//! for the optional post-check.

use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::{has_quorum, Host};
use async_trait::async_trait;

/// Probes `GET health` on every candidate host and records the ones that
/// didn't answer in `ctx.unreachable_hosts`, rather than failing the
/// workflow outright — unless doing so would drop primary coverage below
/// quorum, in which case this *does* fail (§7 error kind 2).
pub struct CheckNmaHealth {
    base: OperationBase,
}

impl CheckNmaHealth {
    pub fn new(hosts: Vec<Host>) -> Self {
        let mut base = OperationBase::new(
            "check_nma_health",
            "checking node management agent connectivity",
            crate::cluster_request::ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base }
    }
}

#[async_trait]
impl Operation for CheckNmaHealth {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        self.base
            .register_hosts(|_| Request::nma(Method::Get, nma::HEALTH));
        Ok(())
    }

    async fn process_result(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        for (host, result) in &self.base.cluster_request.results {
            let host = Host::parse(host)?;
            if result.is_passing() {
                continue;
            }
            ctx.mark_unreachable(host);
        }

        if let Some(topology) = &ctx.topology {
            let sandbox = ctx.sandbox.clone();
            let total = topology.primary_count(&sandbox);
            if total > 0 {
                let reachable_primaries = topology
                    .nodes
                    .iter()
                    .filter(|n| n.is_primary && n.in_sandbox(&sandbox) && !ctx.is_unreachable(&n.host))
                    .count();
                if !has_quorum(reachable_primaries, total) {
                    return Err(OperationError::Quorum {
                        operation: self.base.name.clone(),
                        successes: reachable_primaries,
                        total,
                        required: crate::topology::quorum_threshold(total),
                    });
                }
            }
        }
        Ok(())
    }
}
