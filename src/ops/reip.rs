//! Re-IP a set of nodes to new addresses (§4.8 call sites #1/#2; scenario
//! S5). Grounded on the fan-out-to-all shape, generalized with a
//! `skip_execute` short-circuit when the plan is a no-op.

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::{has_quorum, Host};
use async_trait::async_trait;
use serde_json::json;

/// One requested address change: `target` is the node's current catalog
/// address, `new_address` is what it should become.
#[derive(Debug, Clone)]
pub struct ReIpEntry {
    pub node_name: String,
    pub target: Host,
    pub new_address: Host,
}

/// Rewrites the catalog address of every entry whose `new_address` differs
/// from `target`. If every entry is already a no-op, `prepare` sets
/// `skip_execute` rather than fanning out empty work (S5).
pub struct ReIp {
    base: OperationBase,
    entries: Vec<ReIpEntry>,
    primaries_with_latest_catalog: usize,
    total_primaries: usize,
}

impl ReIp {
    pub fn new(hosts: Vec<Host>, entries: Vec<ReIpEntry>, primaries_with_latest_catalog: usize, total_primaries: usize) -> Self {
        let mut base = OperationBase::new(
            "reip",
            "updating node catalog addresses",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self {
            base,
            entries,
            primaries_with_latest_catalog,
            total_primaries,
        }
    }
}

#[async_trait]
impl Operation for ReIp {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        // Call site #1: the plan must not drop primary catalog coverage
        // below quorum before any request is issued.
        if self.total_primaries > 0 && !has_quorum(self.primaries_with_latest_catalog, self.total_primaries) {
            return Err(OperationError::Quorum {
                operation: self.base.name.clone(),
                successes: self.primaries_with_latest_catalog,
                total: self.total_primaries,
                required: crate::topology::quorum_threshold(self.total_primaries),
            });
        }

        let changed: Vec<&ReIpEntry> = self
            .entries
            .iter()
            .filter(|e| e.target != e.new_address)
            .collect();

        if changed.is_empty() {
            self.base.skip_execute = true;
            return Ok(());
        }

        for entry in &self.entries {
            if entry.target == entry.new_address {
                continue;
            }
            let body = json!({
                "node_name": entry.node_name,
                "target_address": entry.target.to_string(),
                "new_address": entry.new_address.to_string(),
            });
            let request = Request::nma(Method::Put, nma::CATALOG_REIP).with_body(body);
            self.base.cluster_request.set_request(entry.target.to_string(), request);
        }
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let total = self.base.cluster_request.results.len();
        let successes = self
            .base
            .cluster_request
            .results
            .values()
            .filter(|r| r.is_passing())
            .count();

        let failures: Vec<(String, OperationError)> = self
            .base
            .cluster_request
            .results
            .iter()
            .filter(|(_, r)| !r.is_passing())
            .map(|(host, r)| (host.clone(), r.error.clone().unwrap()))
            .collect();

        // Call site #2: the hosts that actually succeeded must still form
        // a quorum of the affected set.
        if total > 0 && !has_quorum(successes, total) {
            return Err(OperationError::Quorum {
                operation: self.base.name.clone(),
                successes,
                total,
                required: crate::topology::quorum_threshold(total),
            });
        }
        if !failures.is_empty() {
            return Err(OperationError::join(self.base.name.clone(), failures));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use std::sync::Arc;

    #[tokio::test]
    async fn s5_identical_targets_skip_execute_and_finalize_still_runs() {
        let host = Host::parse("10.0.0.1").unwrap();
        let entries = vec![ReIpEntry {
            node_name: "v_db_node0001".into(),
            target: host.clone(),
            new_address: host.clone(),
        }];
        let mut op = ReIp::new(vec![host], entries, 1, 1);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));

        op.prepare(&mut ctx).await.unwrap();
        assert!(op.is_skip_execute());
        assert!(op.base.cluster_request.requests.is_empty());
        op.finalize(&mut ctx).await.unwrap();
    }

    #[tokio::test]
    async fn changed_targets_are_not_skipped() {
        let host = Host::parse("10.0.0.1").unwrap();
        let new_host = Host::parse("10.0.0.2").unwrap();
        let entries = vec![ReIpEntry {
            node_name: "v_db_node0001".into(),
            target: host.clone(),
            new_address: new_host,
        }];
        let mut op = ReIp::new(vec![host], entries, 1, 1);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));

        op.prepare(&mut ctx).await.unwrap();
        assert!(!op.is_skip_execute());
        assert_eq!(op.base.cluster_request.requests.len(), 1);
    }

    #[tokio::test]
    async fn insufficient_quorum_in_prepare_fails_before_any_request() {
        let host = Host::parse("10.0.0.1").unwrap();
        let entries = vec![];
        let mut op = ReIp::new(vec![host], entries, 1, 3);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));

        let err = op.prepare(&mut ctx).await.unwrap_err();
        assert!(err.is_quorum());
    }
}
