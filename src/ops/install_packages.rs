//! Install default packages on the database (§4.3 initiator-only; installs
//! run once against a chosen host, not fanned out to every node).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::Result;
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use async_trait::async_trait;
use serde_json::json;

pub struct InstallPackages {
    base: OperationBase,
    force_reinstall: bool,
}

impl InstallPackages {
    pub fn new(force_reinstall: bool) -> Self {
        let base = OperationBase::new(
            "install_packages",
            "installing default packages",
            ApiVersion::new(1, 0, 0),
        );
        Self { base, force_reinstall }
    }
}

#[async_trait]
impl Operation for InstallPackages {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let topology = ctx.topology.as_ref().ok_or_else(|| {
            crate::error::OperationError::Validation(
                "install_packages requires a fetched topology to choose an initiator".to_string(),
            )
        })?;
        let initiator = topology.choose_initiator(&ctx.sandbox)?;
        self.base.hosts = vec![initiator.clone()];
        let body = json!({ "force_reinstall": self.force_reinstall });
        let request = Request::https_db(Method::Post, https_db::PACKAGES).with_body(body);
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
    async fn installs_against_the_chosen_initiator() {
        let topology = Topology {
            nodes: vec![Node {
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
            }],
            subclusters: vec![],
        };
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new())).with_topology(topology);
        let mut op = InstallPackages::new(false);
        op.prepare(&mut ctx).await.unwrap();
        assert_eq!(op.base.cluster_request.requests.len(), 1);

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::success("10.0.0.1", 200, "{}".into()),
        );
        op.process_result(&mut ctx).await.unwrap();
    }
}
