//! Mock agent wrapper for testing against simulated NMA/HTTPS hosts.
//!
//! Each [`MockAgent`] is one `wiremock::MockServer`, standing in for one
//! host's combined NMA + HTTPS DB service (both roots are `v1/`, so a single
//! mock server is enough to answer both). A [`MockCluster`] owns one
//! `MockAgent` per simulated host and produces the `host -> authority`
//! string that must be used as the key in a [`crate::cluster_request::ClusterRequest`]
//! so the insecure-HTTP test dispatcher resolves to the right local port.

use std::collections::BTreeMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One simulated host.
pub struct MockAgent {
    server: MockServer,
}

impl MockAgent {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// The `host:port` authority to use as a dispatch key in place of a real
    /// IP literal.
    pub fn authority(&self) -> String {
        self.server
            .uri()
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .to_string()
    }

    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Mount a response for `method path` under the shared `v1/` root.
    pub async fn mock(&self, http_method: &str, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method(http_method))
            .and(path(format!("/v1/{}", endpoint.trim_start_matches('/'))))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Mount a custom `wiremock::Mock` directly, for scenarios that need
    /// request-body matching or multi-call sequencing.
    pub async fn mount(&self, mock: Mock) {
        mock.mount(&self.server).await;
    }
}

/// A set of mock agents, one per simulated host, keyed by the authority
/// string the test should use as the host key in requests it builds.
#[derive(Default)]
pub struct MockCluster {
    agents: BTreeMap<String, MockAgent>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new agent and register it under its own authority string,
    /// returning that string for convenience.
    pub async fn add_host(&mut self) -> String {
        let agent = MockAgent::start().await;
        let authority = agent.authority();
        self.agents.insert(authority.clone(), agent);
        authority
    }

    pub fn host(&self, authority: &str) -> &MockAgent {
        self.agents
            .get(authority)
            .unwrap_or_else(|| panic!("no mock agent registered for host '{authority}'"))
    }

    pub fn hosts(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::responses;

    #[tokio::test]
    async fn mock_cluster_registers_independent_agents() {
        let mut cluster = MockCluster::new();
        let h1 = cluster.add_host().await;
        let h2 = cluster.add_host().await;
        assert_ne!(h1, h2);
        assert_eq!(cluster.hosts().len(), 2);
    }

    #[tokio::test]
    async fn mounted_response_is_reachable_over_http() {
        let agent = MockAgent::start().await;
        agent
            .mock("GET", "health", responses::success(serde_json::json!({"state": "UP"})))
            .await;

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/v1/health", agent.authority()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }
}
