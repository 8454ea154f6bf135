//! Promote a secondary subcluster to primary (§4.3 initiator-only;
//! §4.9). Grounded on `Topology::choose_initiator`: a single chosen host
//! (an up primary in the target sandbox, else any up host) receives the
//! request — never a fan-out.

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::Result;
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use async_trait::async_trait;

pub struct PromoteSubcluster {
    base: OperationBase,
    subcluster_name: String,
}

impl PromoteSubcluster {
    pub fn new(subcluster_name: impl Into<String>) -> Self {
        let base = OperationBase::new(
            "promote_subcluster",
            "promoting subcluster to primary",
            ApiVersion::new(1, 0, 0),
        );
        Self {
            base,
            subcluster_name: subcluster_name.into(),
        }
    }
}

#[async_trait]
impl Operation for PromoteSubcluster {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let topology = ctx.topology.as_ref().ok_or_else(|| {
            crate::error::OperationError::Validation(
                "promote_subcluster requires a fetched topology to choose an initiator".to_string(),
            )
        })?;
        let initiator = topology.choose_initiator(&ctx.sandbox)?;
        self.base.hosts = vec![initiator.clone()];
        let endpoint = https_db::subcluster_promote(&self.subcluster_name);
        let request = Request::https_db(Method::Put, &endpoint);
        self.base.cluster_request.set_request(initiator.to_string(), request);
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let Some(result) = self.base.cluster_request.results.values().next() else {
            return Ok(());
        };
        if !result.is_passing() {
            return Err(result.error.clone().unwrap());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::result::HostResult;
    use crate::topology::{Node, NodeState, Topology, MAIN_CLUSTER};
    use std::sync::Arc;

    #[tokio::test]
    async fn selects_the_up_primary_as_initiator() {
        let topology = Topology {
            nodes: vec![
                Node {
                    name: "v_db_node0001".into(),
                    host: crate::topology::Host::parse("10.0.0.1").unwrap(),
                    subcluster: "default".into(),
                    sandbox: MAIN_CLUSTER.into(),
                    is_primary: true,
                    state: NodeState::Up,
                    catalog_path: "/catalog".into(),
                    storage_locations: vec![],
                    depot_path: None,
                    version: None,
                },
            ],
            subclusters: vec![],
        };
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new())).with_topology(topology);
        let mut op = PromoteSubcluster::new("sc1");
        op.prepare(&mut ctx).await.unwrap();
        assert_eq!(op.base.hosts, vec![crate::topology::Host::parse("10.0.0.1").unwrap()]);
        assert_eq!(op.base.cluster_request.requests.len(), 1);

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::success("10.0.0.1", 200, "{}".into()),
        );
        op.process_result(&mut ctx).await.unwrap();
    }
}
