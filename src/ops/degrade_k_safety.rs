//! Pre-emptively degrade design-k-safety to zero ahead of a node removal
//! that would otherwise take the cluster below its k-safety threshold
//! (§4.8 call site #3, P4). Initiator-only shape, same pattern as
//! `promote_subcluster`: a single chosen host issues the request, never a
//! fan-out.

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use async_trait::async_trait;

pub struct DegradeKSafety {
    base: OperationBase,
}

impl DegradeKSafety {
    pub fn new() -> Self {
        let base = OperationBase::new(
            "degrade_k_safety",
            "lowering design k-safety to zero before node removal",
            ApiVersion::new(1, 0, 0),
        );
        Self { base }
    }
}

impl Default for DegradeKSafety {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operation for DegradeKSafety {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let topology = ctx.topology.as_ref().ok_or_else(|| {
            OperationError::Validation(
                "degrade_k_safety requires a fetched topology to choose an initiator".to_string(),
            )
        })?;
        let initiator = topology.choose_initiator(&ctx.sandbox)?;
        self.base.hosts = vec![initiator.clone()];
        let request = Request::https_db(Method::Put, https_db::CLUSTER_KSAFETY_DEGRADE);
        self.base.cluster_request.set_request(initiator.to_string(), request);
        Ok(())
    }

    async fn process_result(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let Some(result) = self.base.cluster_request.results.values().next() else {
            return Ok(());
        };
        if !result.is_passing() {
            return Err(result.error.clone().unwrap());
        }
        ctx.k_safety_degraded = true;
        Ok(())
    }
}
