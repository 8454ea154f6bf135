//! Check that every host in every targeted subcluster reports the same
//! Vertica version (§4.3 fan-out-to-all; scenario S2).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct VersionResponse {
    vertica_version: String,
}

/// Requires every host to agree on the reported Vertica version within its
/// own subcluster (membership taken from `ctx.up_sc_info`); if two hosts in
/// the same subcluster disagree, this fails with a `Domain` error naming
/// both versions and the subcluster.
pub struct CheckVerticaVersion {
    base: OperationBase,
}

impl CheckVerticaVersion {
    pub fn new(hosts: Vec<Host>) -> Self {
        let mut base = OperationBase::new(
            "check_vertica_version",
            "checking that all nodes report a matching Vertica version",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self { base }
    }
}

#[async_trait]
impl Operation for CheckVerticaVersion {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        self.base
            .register_hosts(|_| Request::nma(Method::Get, nma::VERTICA_VERSION));
        Ok(())
    }

    async fn process_result(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let mut failures = Vec::new();
        // subcluster -> (version -> one representative host that reported it)
        let mut by_subcluster: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

        for (host, result) in &self.base.cluster_request.results {
            if !result.is_passing() {
                failures.push((host.clone(), result.error.clone().unwrap()));
                continue;
            }
            let parsed: VersionResponse = serde_json::from_str(&result.body).map_err(|e| {
                OperationError::Protocol {
                    host: host.clone(),
                    message: format!("failed to parse version response: {e}"),
                }
            })?;
            let subcluster = ctx
                .up_sc_info
                .get(host)
                .cloned()
                .unwrap_or_else(|| "default_subcluster".to_string());
            by_subcluster
                .entry(subcluster)
                .or_default()
                .entry(parsed.vertica_version)
                .or_insert_with(|| host.clone());
        }

        if !failures.is_empty() {
            return Err(OperationError::join(self.base.name.clone(), failures));
        }

        for (subcluster, versions) in &by_subcluster {
            if versions.len() > 1 {
                let mut seen: Vec<&String> = versions.keys().collect();
                seen.sort();
                return Err(OperationError::Domain {
                    operation: self.base.name.clone(),
                    message: format!(
                        "Found mismatched versions: [{}] and [{}] in subcluster [{}]",
                        seen[0], seen[1], subcluster
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::result::HostResult;
    use std::sync::Arc;

    #[tokio::test]
    async fn s2_mismatched_versions_in_one_subcluster_is_a_domain_error() {
        let hosts = vec![
            Host::parse("10.0.0.1").unwrap(),
            Host::parse("10.0.0.2").unwrap(),
            Host::parse("10.0.0.3").unwrap(),
            Host::parse("10.0.0.4").unwrap(),
        ];
        let mut op = CheckVerticaVersion::new(hosts);
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        ctx.up_sc_info.insert("10.0.0.1".into(), "default".into());
        ctx.up_sc_info.insert("10.0.0.2".into(), "default".into());
        ctx.up_sc_info.insert("10.0.0.3".into(), "sc1".into());
        ctx.up_sc_info.insert("10.0.0.4".into(), "sc1".into());
        op.prepare(&mut ctx).await.unwrap();

        for (host, version) in [
            ("10.0.0.1", "v24.1.0"),
            ("10.0.0.2", "v24.1.0"),
            ("10.0.0.3", "v24.0.0"),
            ("10.0.0.4", "v24.1.0"),
        ] {
            op.base.cluster_request.results.insert(
                host.to_string(),
                HostResult::success(host, 200, format!(r#"{{"vertica_version":"{version}"}}"#)),
            );
        }

        let err = op.process_result(&mut ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "operation check_vertica_version rejected by policy: Found mismatched versions: [v24.0.0] and [v24.1.0] in subcluster [sc1]"
        );
    }
}
