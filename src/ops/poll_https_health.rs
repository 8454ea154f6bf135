//! Poll the HTTPS database service's health endpoint until every host
//! answers, tolerating 401s while a TLS trust rotation is still propagating
//! (§7 error kind 3 exception; scenario S4).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::{OperationError, Result};
use crate::operation::polling::{poll_state, Pollable};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use std::time::Duration;

/// Polls `GET health` against the HTTPS-DB service on every host. A 401 is
/// treated as "not done yet" rather than fatal, because during a TLS trust
/// rotation some hosts briefly reject the old client cert before they've
/// picked up the new one; any other failure kind still ends the poll.
pub struct PollHttpsHealth {
    base: OperationBase,
    timeout: Duration,
}

impl PollHttpsHealth {
    pub fn new(hosts: Vec<Host>, timeout: Duration) -> Self {
        let mut base = OperationBase::new(
            "poll_https_health",
            "waiting for the database HTTPS service to come up",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base, timeout }
    }
}

#[async_trait]
impl Operation for PollHttpsHealth {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        self.base
            .register_hosts(|_| Request::https_db(Method::Get, https_db::HEALTH));
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
impl Pollable for PollHttpsHealth {
    async fn should_stop_polling(&mut self, _ctx: &mut ExecutionContext) -> (bool, Option<OperationError>) {
        let mut all_done = true;
        for result in self.base.cluster_request.results.values() {
            if result.is_passing() {
                continue;
            }
            if result.is_unauthorized() {
                all_done = false;
                continue;
            }
            return (true, result.error.clone());
        }
        if all_done {
            self.base.spinner.succeed("database HTTPS service is up on every host");
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
    async fn s4_401_is_tolerated_as_not_done_yet() {
        let h1 = Host::parse("10.0.0.1").unwrap();
        let mut op = PollHttpsHealth::new(vec![h1.clone()], Duration::from_secs(1));
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        op.prepare(&mut ctx).await.unwrap();

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::failure(
                "10.0.0.1",
                401,
                "bad cert".to_string(),
                OperationError::Authentication {
                    host: "10.0.0.1".into(),
                    message: "bad cert".into(),
                },
            ),
        );
        let (done, err) = op.should_stop_polling(&mut ctx).await;
        assert!(!done);
        assert!(err.is_none());

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::success("10.0.0.1", 200, "{}".to_string()),
        );
        let (done, err) = op.should_stop_polling(&mut ctx).await;
        assert!(done);
        assert!(err.is_none());
    }

    #[tokio::test]
    async fn other_failure_kinds_end_the_poll_immediately() {
        let h1 = Host::parse("10.0.0.1").unwrap();
        let mut op = PollHttpsHealth::new(vec![h1.clone()], Duration::from_secs(1));
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        op.prepare(&mut ctx).await.unwrap();

        op.base.cluster_request.results.insert(
            "10.0.0.1".to_string(),
            HostResult::exception(
                "10.0.0.1",
                OperationError::Tls {
                    host: "10.0.0.1".into(),
                    message: "handshake failure".into(),
                },
            ),
        );
        let (done, err) = op.should_stop_polling(&mut ctx).await;
        assert!(done);
        assert!(err.unwrap().is_tls());
    }
}
