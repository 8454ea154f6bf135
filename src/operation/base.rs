//! `OperationBase`: the shared state and helper methods every concrete
//! operation composes in, rather than inheriting (§9 design note). Grounded
//! on the "shared struct + constructor" shape of `src/macros.rs`'s
//! `define_handler!`, generalized because each operation's lifecycle hooks
//! genuinely differ (a macro can't express four divergent hook bodies).

use crate::cluster_request::{ApiVersion, ClusterRequest};
use crate::context::ExecutionContext;
use crate::error::{OperationError, Result};
use crate::request::Credentials;
use crate::tls::{RequestTls, Service, TlsOptions};
use crate::topology::{has_quorum, Host};
use tracing::{info, warn};

/// No-op spinner: a library has no terminal to paint progress onto, but we
/// keep the lifecycle (`start`/`succeed`/`fail`) as a capability so a
/// consumer embedding this crate in a CLI can later swap in a real one.
/// Matches the teacher's and spec's "spinner is a no-op when not attached
/// to a terminal" contract (§4.3).
#[derive(Debug, Default, Clone)]
pub struct Spinner {
    message: String,
}

impl Spinner {
    pub fn start(&mut self, message: impl Into<String>) {
        self.message = message.into();
        info!(spinner = %self.message, "operation started");
    }

    pub fn update(&mut self, message: impl Into<String>) {
        self.message = message.into();
        info!(spinner = %self.message, "operation progress");
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.message = message.into();
        info!(spinner = %self.message, "operation succeeded");
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.message = message.into();
        warn!(spinner = %self.message, "operation failed");
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Shared fields and helpers every concrete [`crate::operation::Operation`]
/// composes in.
pub struct OperationBase {
    pub name: String,
    pub description: String,
    pub hosts: Vec<Host>,
    pub cluster_request: ClusterRequest,
    pub skip_execute: bool,
    pub spinner: Spinner,
}

impl OperationBase {
    pub fn new(name: impl Into<String>, description: impl Into<String>, version: ApiVersion) -> Self {
        let name = name.into();
        Self {
            cluster_request: ClusterRequest::new(name.clone(), version),
            name,
            description: description.into(),
            hosts: Vec::new(),
            skip_execute: false,
            spinner: Spinner::default(),
        }
    }

    /// §4.3: shrink `hosts` to those not present in
    /// `ctx.unreachable_hosts`, invoked by the engine before `prepare`.
    pub fn filter_unreachable_hosts(&mut self, ctx: &ExecutionContext) {
        self.hosts.retain(|h| !ctx.is_unreachable(h));
    }

    /// §4.9: if the context targets a sandbox other than the main-cluster
    /// sentinel and a topology view is available, drop any host whose node
    /// is not in that sandbox.
    pub fn filter_hosts_by_sandbox(&mut self, ctx: &ExecutionContext) {
        if ctx.sandbox == crate::topology::MAIN_CLUSTER {
            return;
        }
        let Some(topology) = &ctx.topology else {
            return;
        };
        self.hosts.retain(|h| {
            topology
                .nodes
                .iter()
                .any(|n| &n.host == h && n.in_sandbox(&ctx.sandbox))
        });
    }

    /// Once `prepare` has populated the request map, copy TLS config into
    /// every request (§4.1, P2).
    pub fn apply_tls_options(&mut self, options: &TlsOptions) {
        for request in self.cluster_request.requests.values_mut() {
            let mode = options.mode_for(request.service);
            request.tls = RequestTls {
                mode: Some(mode),
                client_cert: options.client_cert.clone(),
            };
        }
    }

    /// Validate and attach basic-auth credentials to an HTTPS-DB request.
    /// Per §3.6 the username must be non-empty; the password keeps its
    /// nil/empty distinction.
    pub fn validate_and_set_credentials(
        &self,
        username: &str,
        password: Option<String>,
    ) -> Result<Credentials> {
        if username.trim().is_empty() {
            return Err(OperationError::Validation(
                "username must not be empty for HTTPS database service requests".to_string(),
            ));
        }
        Ok(Credentials::new(username, password))
    }

    /// `hasQuorum(healthyPrimaries, totalPrimaries)` (§3.6, §4.8).
    pub fn has_quorum(&self, healthy_primaries: usize, total_primaries: usize) -> bool {
        has_quorum(healthy_primaries, total_primaries)
    }

    /// Register the final host list with the cluster request, one request
    /// per host as built by `build`.
    pub fn register_hosts(
        &mut self,
        build: impl Fn(&Host) -> crate::request::Request,
    ) {
        for host in self.hosts.clone() {
            let request = build(&host);
            self.cluster_request.set_request(host.to_string(), request);
        }
    }

    pub fn service(&self) -> Option<Service> {
        self.cluster_request
            .requests
            .values()
            .next()
            .map(|r| r.service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_request::ApiVersion;
    use crate::context::ExecutionContext;
    use crate::dispatcher::Dispatcher;
    use crate::topology::{Node, NodeState, Topology, MAIN_CLUSTER};
    use std::sync::Arc;

    #[test]
    fn filter_unreachable_hosts_drops_marked_hosts() {
        let mut base = OperationBase::new("op", "desc", ApiVersion::new(1, 0, 0));
        base.hosts = vec![Host::parse("10.0.0.1").unwrap(), Host::parse("10.0.0.2").unwrap()];
        let mut ctx = ExecutionContext::new(Arc::new(Dispatcher::new()));
        ctx.mark_unreachable(Host::parse("10.0.0.1").unwrap());
        base.filter_unreachable_hosts(&ctx);
        assert_eq!(base.hosts, vec![Host::parse("10.0.0.2").unwrap()]);
    }

    #[test]
    fn filter_hosts_by_sandbox_keeps_only_matching_nodes() {
        let mut base = OperationBase::new("op", "desc", ApiVersion::new(1, 0, 0));
        base.hosts = vec![Host::parse("10.0.0.1").unwrap(), Host::parse("10.0.0.2").unwrap()];

        let topology = Topology {
            nodes: vec![
                Node {
                    name: "n1".into(),
                    host: Host::parse("10.0.0.1").unwrap(),
                    subcluster: "default".into(),
                    sandbox: "sb1".into(),
                    is_primary: true,
                    state: NodeState::Up,
                    catalog_path: "/catalog".into(),
                    storage_locations: vec![],
                    depot_path: None,
                    version: None,
                },
                Node {
                    name: "n2".into(),
                    host: Host::parse("10.0.0.2").unwrap(),
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
        let ctx = ExecutionContext::new(Arc::new(Dispatcher::new()))
            .with_sandbox("sb1")
            .with_topology(topology);
        base.filter_hosts_by_sandbox(&ctx);
        assert_eq!(base.hosts, vec![Host::parse("10.0.0.1").unwrap()]);
    }

    #[test]
    fn validate_credentials_rejects_empty_username() {
        let base = OperationBase::new("op", "desc", ApiVersion::new(1, 0, 0));
        assert!(base.validate_and_set_credentials("", None).is_err());
        assert!(base.validate_and_set_credentials("dbadmin", Some(String::new())).is_ok());
    }
}
