//! Rotate the NMA's HTTPS server certificate on every host (§4.3
//! fan-out-to-all then AND; §4.7, §7 error kind 3 — 401 is tolerated during
//! the subsequent health poll, but not here, since this operation only
//! issues the rotation request itself).

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::nma;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use serde_json::json;

pub struct RotateTlsCerts {
    base: OperationBase,
    key_pem: String,
    cert_pem: String,
    ca_cert_pem: Option<String>,
}

impl RotateTlsCerts {
    pub fn new(hosts: Vec<Host>, key_pem: impl Into<String>, cert_pem: impl Into<String>, ca_cert_pem: Option<String>) -> Self {
        let mut base = OperationBase::new(
            "rotate_tls_certs",
            "rotating NMA HTTPS certificates",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self {
            base,
            key_pem: key_pem.into(),
            cert_pem: cert_pem.into(),
            ca_cert_pem,
        }
    }
}

#[async_trait]
impl Operation for RotateTlsCerts {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let body = json!({
            "key": self.key_pem,
            "cert": self.cert_pem,
            "ca_cert": self.ca_cert_pem,
        });
        self.base
            .register_hosts(|_| Request::nma(Method::Post, nma::ROTATE_CERTS).with_body(body.clone()));
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let mut failures: Vec<(String, OperationError)> = Vec::new();
        for (host, result) in &self.base.cluster_request.results {
            if result.is_unauthorized() {
                return Err(result.error.clone().unwrap());
            }
            if !result.is_passing() {
                failures.push((host.clone(), result.error.clone().unwrap()));
            }
        }
        if !failures.is_empty() {
            return Err(OperationError::join(self.base.name.clone(), failures));
        }
        Ok(())
    }
}
