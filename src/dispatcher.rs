//! The parallel dispatcher (C2): fan-out a cluster request across hosts,
//! honouring per-request TLS/credential policy, and classify each response.
//!
//! Grounded on `src/client.rs`'s per-verb request builders and
//! `handle_response`/`map_reqwest_error`, generalized from issuing one HTTP
//! call to issuing N concurrent ones and collecting a `host -> HostResult`
//! map (P1).

use crate::cluster_request::ClusterRequest;
use crate::error::OperationError;
use crate::masking::mask_sensitive;
use crate::request::{Method, Request};
use crate::result::HostResult;
use crate::tls::{ClientCertPair, Service, VerificationMode};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// Scheme used to build request URLs. Defaults to `Https`; `test-support`
/// builds flip individual dispatches to `Http` so they can talk to a local
/// `wiremock` server without a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

/// Fan-out dispatcher. One instance is constructed per engine run and
/// threaded through the execution context; it owns a small cache of
/// `reqwest::Client`s keyed by `(Service, verify_server_cert,
/// verify_peer_cert_hostname)` so TLS configuration (baked in at
/// client-construction time via `danger_accept_invalid_certs`/
/// `danger_accept_invalid_hostnames`) isn't rebuilt per host.
pub struct Dispatcher {
    scheme: Scheme,
    clients: tokio::sync::Mutex<HashMap<(bool, bool), Arc<Client>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            scheme: Scheme::Https,
            clients: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Construct a dispatcher that issues plaintext HTTP, for use against
    /// `wiremock` mock agents under the `test-support` feature.
    pub fn insecure_for_testing() -> Self {
        Self {
            scheme: Scheme::Http,
            clients: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    async fn client_for(
        &self,
        mode: VerificationMode,
        client_cert: Option<&Arc<ClientCertPair>>,
    ) -> crate::error::Result<Arc<Client>> {
        let key = (mode.verify_server_cert, mode.verify_peer_cert_hostname);
        {
            let cache = self.clients.lock().await;
            if let Some(client) = cache.get(&key) {
                return Ok(client.clone());
            }
        }

        let mut builder = Client::builder()
            .danger_accept_invalid_certs(!mode.verify_server_cert)
            .danger_accept_invalid_hostnames(!mode.verify_peer_cert_hostname);

        if let Some(pair) = client_cert {
            let mut identity_pem = pair.key_pem.clone();
            identity_pem.extend_from_slice(&pair.cert_pem);
            if let Ok(identity) = reqwest::Identity::from_pem(&identity_pem) {
                builder = builder.identity(identity);
            }
            if let Some(ca) = &pair.ca_cert_pem {
                if let Ok(cert) = reqwest::Certificate::from_pem(ca) {
                    builder = builder.add_root_certificate(cert);
                }
            }
        }

        let client = builder
            .build()
            .map_err(|e| OperationError::Validation(format!("failed to build HTTP client: {e}")))?;
        let client = Arc::new(client);

        let mut cache = self.clients.lock().await;
        cache.insert(key, client.clone());
        Ok(client)
    }

    fn url_for(&self, host: &str, request: &Request) -> crate::error::Result<String> {
        let raw = format!(
            "{}://{}/{}",
            self.scheme.as_str(),
            host,
            request.endpoint.trim_start_matches('/')
        );
        let mut url = url::Url::parse(&raw)
            .map_err(|e| OperationError::Validation(format!("built an invalid request URL '{raw}': {e}")))?;
        if let Some(qs) = request.query_string()? {
            url.set_query(Some(&qs));
        }
        Ok(url.into())
    }

    /// Dispatch every request currently populated on `cluster_request` in
    /// parallel — one task per host via `JoinSet` — and write back the
    /// `host -> HostResult` map. Never returns an error itself; individual
    /// host failures are captured in the results map (P1: the result map
    /// always ends up with exactly the keys the request map had).
    pub async fn dispatch(&self, cluster_request: &mut ClusterRequest) {
        let mut set: JoinSet<(String, HostResult)> = JoinSet::new();

        for (host, request) in cluster_request.requests.clone() {
            let mode = request
                .tls
                .mode
                .unwrap_or_else(|| match request.service {
                    Service::Nma => VerificationMode::insecure(),
                    Service::HttpsDb => VerificationMode::insecure(),
                });
            let client_cert = request.tls.client_cert.clone();
            let client = match self.client_for(mode, client_cert.as_ref()).await {
                Ok(c) => c,
                Err(e) => {
                    cluster_request.results.insert(
                        host.clone(),
                        HostResult::exception(host.clone(), e),
                    );
                    continue;
                }
            };
            let url = match self.url_for(&host, &request) {
                Ok(u) => u,
                Err(e) => {
                    cluster_request
                        .results
                        .insert(host.clone(), HostResult::exception(host.clone(), e));
                    continue;
                }
            };

            set.spawn(execute_one(client, url, request, host));
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((host, result)) => {
                    cluster_request.results.insert(host, result);
                }
                Err(join_err) => {
                    warn!("dispatch task panicked: {join_err}");
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn execute_one(client: Arc<Client>, url: String, request: Request, host: String) -> (String, HostResult) {
    if let Some(body) = &request.body {
        trace!(host = %host, body = ?mask_sensitive(body), "request body");
    }
    debug!(method = request.method.as_str(), %url, "dispatching request");

    let mut builder = match request.method {
        Method::Get => client.get(&url),
        Method::Put => client.put(&url),
        Method::Post => client.post(&url),
        Method::Delete => client.delete(&url),
    };

    if let Some(creds) = &request.credentials {
        builder = builder.basic_auth(&creds.username, creds.password.clone());
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    let send = tokio::time::timeout(request.timeout, builder.send()).await;

    let response = match send {
        Ok(Ok(resp)) => resp,
        Ok(Err(transport_err)) => {
            let result = classify_transport_error(&host, &transport_err);
            return (host, result);
        }
        Err(_elapsed) => {
            let err = OperationError::Timeout {
                host: host.clone(),
                timeout_secs: request.timeout.as_secs(),
            };
            return (host, HostResult::failure(host.clone(), 0, String::new(), err));
        }
    };

    let status = response.status();
    let body_text = match response.text().await {
        Ok(t) => t,
        Err(transport_err) => {
            let result = classify_transport_error(&host, &transport_err);
            return (host, result);
        }
    };

    trace!(host = %host, status = status.as_u16(), "response received");

    if status.is_success() {
        (host.clone(), HostResult::success(host, status.as_u16(), body_text))
    } else {
        let err = classify_status(&host, status.as_u16(), &body_text);
        (
            host.clone(),
            HostResult::failure(host, status.as_u16(), body_text, err),
        )
    }
}

fn classify_status(host: &str, code: u16, body: &str) -> OperationError {
    if code == 401 {
        OperationError::Authentication {
            host: host.to_string(),
            message: body.to_string(),
        }
    } else {
        OperationError::Server {
            host: host.to_string(),
            code,
            message: body.to_string(),
        }
    }
}

/// Classify a `reqwest::Error` into `EXCEPTION` (TLS handshake/verification
/// failure), `EOF_EXCEPTION` (peer closed the connection before headers),
/// timeout, or a generic transport failure surfaced as `EXCEPTION`.
fn classify_transport_error(host: &str, err: &reqwest::Error) -> HostResult {
    let host = host.to_string();
    if err.is_timeout() {
        let op_err = OperationError::Timeout {
            host: host.clone(),
            timeout_secs: 0,
        };
        return HostResult::failure(host, 0, String::new(), op_err);
    }

    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("certificate") || lower.contains("tls") || lower.contains("handshake") {
        let op_err = OperationError::Tls {
            host: host.clone(),
            message,
        };
        return HostResult::exception(host, op_err);
    }
    if lower.contains("connection closed before message completed")
        || lower.contains("unexpected eof")
        || lower.contains("eof")
    {
        let op_err = OperationError::Protocol {
            host: host.clone(),
            message,
        };
        return HostResult::eof_exception(host, op_err);
    }

    let op_err = OperationError::Server {
        host: host.clone(),
        code: 0,
        message,
    };
    HostResult::exception(host, op_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_renders_as_expected() {
        assert_eq!(Scheme::Https.as_str(), "https");
        assert_eq!(Scheme::Http.as_str(), "http");
    }
}
