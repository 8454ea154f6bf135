//! Create the local data depot on every targeted host (§4.3 fan-out-to-all
//! then AND; §4.7 "join-all").

use crate::cluster_request::ApiVersion;
use crate::context::ExecutionContext;
use crate::endpoints::https_db;
use crate::error::{OperationError, Result};
use crate::operation::{Operation, OperationBase};
use crate::request::{Credentials, Method, Request};
use crate::topology::Host;
use async_trait::async_trait;
use serde_json::json;

pub struct CreateDepot {
    base: OperationBase,
    depot_path: String,
    username: String,
    password: Option<String>,
}

impl CreateDepot {
    pub fn new(hosts: Vec<Host>, depot_path: impl Into<String>, username: impl Into<String>, password: Option<String>) -> Self {
        let mut base = OperationBase::new(
            "create_depot",
            "creating depot storage on every host",
            ApiVersion::new(1, 0, 0),
        );
        base.hosts = hosts;
        Self {
            base,
            depot_path: depot_path.into(),
            username: username.into(),
            password,
        }
    }
}

#[async_trait]
impl Operation for CreateDepot {
    fn base(&self) -> &OperationBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    async fn prepare(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        let credentials = self
            .base
            .validate_and_set_credentials(&self.username, self.password.clone())?;
        let depot_path = self.depot_path.clone();
        for host in self.base.hosts.clone() {
            let body = json!({ "depot_path": depot_path });
            let request = Request::https_db(Method::Post, &https_db::node_depot(host.as_str()))
                .with_body(body)
                .with_credentials(Credentials::new(credentials.username.clone(), credentials.password.clone()));
            self.base.cluster_request.set_request(host.to_string(), request);
        }
        Ok(())
    }

    async fn process_result(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        // BTreeMap iteration is already sorted by host key, so a 401 fast-fail
        // below fires on the lowest-addressed unauthorized host deterministically.
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
