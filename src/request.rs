//! Per-host request description (C1 §3.1, §4.1).

use crate::tls::{RequestTls, Service};
use serde_json::Value;
use std::time::Duration;

/// Default per-request timeout (§5): 30 seconds.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// HTTP basic-auth credentials. The password is `Option<String>` rather than
/// `String` so that "no password supplied" (`None`) remains distinguishable
/// from "empty password" (`Some(String::new())`) all the way to the wire
/// (§5, R1).
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// One outbound HTTP call, scoped to a single host. Built via
/// [`Request::nma`] or [`Request::https_db`], which prefix the endpoint with
/// the service's API-version root and record the target service so the
/// dispatcher and `apply_tls_options` know which TLS policy applies.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub service: Service,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    pub tls: RequestTls,
}

impl Request {
    fn new(service: Service, method: Method, path: &str) -> Self {
        let endpoint = format!("{}{}", service.api_root(), path.trim_start_matches('/'));
        Self {
            method,
            endpoint,
            service,
            query: Vec::new(),
            body: None,
            credentials: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            tls: RequestTls::default(),
        }
    }

    /// Build a request against the Node Management Agent. NMA requests
    /// never carry basic auth (§3.6) — the NMA authenticates by TLS mode
    /// alone.
    pub fn nma(method: Method, path: &str) -> Self {
        Self::new(Service::Nma, method, path)
    }

    /// Build a request against the HTTPS database service.
    pub fn https_db(method: Method, path: &str) -> Self {
        Self::new(Service::HttpsDb, method, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach basic-auth credentials. Only valid for `Service::HttpsDb`
    /// requests (§3.6); `prepare` implementations must not call this on an
    /// NMA request.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        debug_assert!(
            matches!(self.service, Service::HttpsDb),
            "NMA requests never carry basic auth"
        );
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the query parameters as a URL-encoded string, or `None` if
    /// there are none.
    pub fn query_string(&self) -> crate::error::Result<Option<String>> {
        if self.query.is_empty() {
            return Ok(None);
        }
        serde_urlencoded::to_string(&self.query)
            .map(Some)
            .map_err(|e| crate::error::OperationError::Validation(format!("bad query params: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nma_endpoint_gets_api_root_prefix() {
        let req = Request::nma(Method::Get, "vertica/version");
        assert_eq!(req.endpoint, "v1/vertica/version");
        assert_eq!(req.service, Service::Nma);
    }

    #[test]
    fn https_db_endpoint_gets_api_root_prefix() {
        let req = Request::https_db(Method::Get, "/nodes");
        assert_eq!(req.endpoint, "v1/nodes");
    }

    #[test]
    fn nil_and_empty_password_are_distinguishable() {
        let none = Credentials::new("dbadmin", None);
        let empty = Credentials::new("dbadmin", Some(String::new()));
        assert!(none.password.is_none());
        assert_eq!(empty.password, Some(String::new()));
        assert_ne!(none.password, empty.password);
    }
}
