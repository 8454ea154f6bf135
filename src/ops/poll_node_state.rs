//! Poll every host's NMA health endpoint until all report `UP` (§4.6;
//! scenario S3).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::polling::{poll_state, Pollable};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::{Host, NodeState};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct HealthResponse {
    state: String,
}

pub struct PollNodeState {
    base: OperationBase,
    timeout: Duration,
}

impl PollNodeState {
    pub fn new(hosts: Vec<Host>, timeout: Duration) -> Self {
        let mut base = OperationBase::new(
            "poll_node_state",
            "waiting for all nodes to come up",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base, timeout }
    }
}

#[async_trait]
impl Operation for PollNodeState {
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

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        poll_state(self, ctx).await
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl Pollable for PollNodeState {
    async fn should_stop_polling(&mut self, _ctx: &mut ExecutionContext) -> (bool, Option<OperationError>) {
        let mut all_up = true;
        for result in self.base.cluster_request.results.values() {
            if !result.is_passing() {
                if !result.is_timeout() {
                    return (true, result.error.clone());
                }
                all_up = false;
                continue;
            }
            match serde_json::from_str::<HealthResponse>(&result.body) {
                Ok(parsed) if NodeState::from_wire(&parsed.state) == NodeState::Up => {}
                Ok(_) => all_up = false,
                Err(e) => {
                    return (
                        true,
                        Some(OperationError::Protocol {
                            host: result.host.clone(),
                            message: format!("failed to parse health body: {e}"),
                        }),
                    )
                }
            }
        }
        if all_up {
            self.base.spinner.succeed("all nodes are up");
            (true, None)
        } else {
            (false, None)
        }
    }

    fn polling_timeout(&self) -> Duration {
        self.timeout
    }

    fn polling_interval(&self) -> Duration {
        Duration::from_millis(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::result::HostResult;
    use std::sync::Arc;

    #[tokio::test]
    async fn reports_done_once_every_host_reports_up() {
        let mut op = PollNodeState::new(vec![Host::parse("10.0.0.1").unwrap()], Duration::from_secs(1));
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        op.prepare(&mut ctx).await.unwrap();

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::success("10.0.0.1", 200, r#"{"state":"DOWN"}"#.to_string()),
        );
        let (done, err) = op.should_stop_polling(&mut ctx).await;
        assert!(!done);
        assert!(err.is_none());

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::success("10.0.0.1", 200, r#"{"state":"UP"}"#.to_string()),
        );
        let (done, err) = op.should_stop_polling(&mut ctx).await;
        assert!(done);
        assert!(err.is_none());
        assert_eq!(op.base.spinner.message(), "all nodes are up");
    }
}
