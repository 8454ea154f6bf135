//! Fetch basic cluster info from whichever up host answers first (§4.3
//! fan-out-to-all then first-success).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub db_name: String,
    pub communal_storage_path: Option<String>,
}

pub struct GetClusterInfo {
    base: OperationBase,
    pub info: Option<ClusterInfo>,
}

impl GetClusterInfo {
    pub fn new(hosts: Vec<Host>) -> Self {
        let mut base = OperationBase::new(
            "get_cluster_info",
            "reading cluster info",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base, info: None }
    }
}

#[async_trait]
impl Operation for GetClusterInfo {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        self.base
            .register_hosts(|_| Request::https_db(Method::Get, https_db::CLUSTER));
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let mut last_err = None;
        for (host, result) in &self.base.cluster_request.results {
            if result.is_unauthorized() {
                return Err(result.error.clone().unwrap());
            }
            if !result.is_passing() {
                last_err = result.error.clone();
                continue;
            }
            let deserializer = &mut serde_json::Deserializer::from_str(&result.body);
            let parsed: ClusterInfo = serde_path_to_error::deserialize(deserializer).map_err(|e| {
                OperationError::Protocol {
                    host: host.clone(),
                    message: format!("failed to parse cluster info at {}: {e}", e.path()),
                }
            })?;
            self.info = Some(parsed);
            return Ok(());
        }
        Err(last_err.unwrap_or_else(|| OperationError::Validation("no hosts available to query cluster info".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::result::HostResult;
    use std::sync::Arc;

    #[tokio::test]
    async fn stops_at_the_first_passing_host() {
        let hosts = vec![Host::parse("10.0.0.1").unwrap(), Host::parse("10.0.0.2").unwrap()];
        let mut op = GetClusterInfo::new(hosts);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        op.prepare(&mut ctx).await.unwrap();

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::exception(
                "10.0.0.1",
                OperationError::Timeout {
                    host: "10.0.0.1".into(),
                    timeout_secs: 30,
                },
            ),
        );
        op.base.cluster_request.results.insert(
            "10.0.0.2".to_string(),
            HostResult::success("10.0.0.2", 200, r#"{"db_name":"vdb1"}"#.to_string()),
        );

        op.process_result(&mut ctx).await.unwrap();
        assert_eq!(op.info.unwrap().db_name, "vdb1");
    }

    #[tokio::test]
    async fn a_401_short_circuits_even_with_other_hosts_untried() {
        let hosts = vec![Host::parse("10.0.0.1").unwrap()];
        let mut op = GetClusterInfo::new(hosts);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        op.prepare(&mut ctx).await.unwrap();
        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::failure(
                "10.0.0.1",
                401,
                "wrong password".to_string(),
                OperationError::Authentication {
                    host: "10.0.0.1".into(),
                    message: "wrong password".into(),
                },
            ),
        );
        let err = op.process_result(&mut ctx).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
