//! Pre-built fixtures for testing against mock NMA/HTTPS agents.
//!
//! All fixtures use the builder pattern for customization, following the
//! teacher's `DatabaseFixture`/`NodeFixture` shape.
//!
//! # Example
//!
//! ```
//! use vertica_opengine::testing::fixtures::{NodeFixture, VersionFixture};
//!
//! let node = NodeFixture::new("v_db_node0001", "10.0.0.1").build();
//! let version = VersionFixture::new("v24.1.0").build();
//! ```

use serde_json::{json, Value};

/// Builder for a single NMA/HTTPS node fixture.
#[derive(Debug, Clone)]
pub struct NodeFixture {
    name: String,
    host: String,
    subcluster: String,
    sandbox: String,
    is_primary: bool,
    state: String,
    catalog_path: String,
}

impl NodeFixture {
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            subcluster: "default_subcluster".to_string(),
            sandbox: String::new(),
            is_primary: true,
            state: "UP".to_string(),
            catalog_path: "/catalog".to_string(),
        }
    }

    pub fn subcluster(mut self, name: impl Into<String>) -> Self {
        self.subcluster = name.into();
        self
    }

    pub fn sandbox(mut self, name: impl Into<String>) -> Self {
        self.sandbox = name.into();
        self
    }

    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn build(self) -> Value {
        json!({
            "name": self.name,
            "address": self.host,
            "subcluster_name": self.subcluster,
            "sandbox": self.sandbox,
            "is_primary": self.is_primary,
            "state": self.state,
            "catalog_path": self.catalog_path,
        })
    }
}

/// Builder for the `GET nodes` list response body, as returned by the
/// HTTPS DB service.
#[derive(Debug, Clone, Default)]
pub struct NodesListFixture {
    nodes: Vec<Value>,
}

impl NodesListFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Value) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> Value {
        json!({ "node_list": self.nodes })
    }
}

/// Builder for `GET vertica/version` NMA responses.
#[derive(Debug, Clone)]
pub struct VersionFixture {
    version: String,
}

impl VersionFixture {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn build(self) -> Value {
        json!({ "vertica_version": self.version })
    }
}

/// Builder for `GET health` / `health/vcluster-server` NMA responses.
#[derive(Debug, Clone)]
pub struct HealthFixture {
    state: String,
    vcluster_server_pid_file_exists: bool,
}

impl HealthFixture {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            vcluster_server_pid_file_exists: false,
        }
    }

    pub fn vcluster_server_pid_file_exists(mut self, exists: bool) -> Self {
        self.vcluster_server_pid_file_exists = exists;
        self
    }

    pub fn build(self) -> Value {
        json!({
            "state": self.state,
            "vcluster_server_pid_file_exists": self.vcluster_server_pid_file_exists.to_string(),
        })
    }
}

/// Builder for a subcluster fixture as returned by `GET subclusters`.
#[derive(Debug, Clone)]
pub struct SubclusterFixture {
    name: String,
    is_default: bool,
    is_secondary: bool,
    control_set_size: u32,
    sandbox: String,
}

impl SubclusterFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            is_secondary: false,
            control_set_size: 3,
            sandbox: String::new(),
        }
    }

    pub fn default_subcluster(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn sandbox(mut self, name: impl Into<String>) -> Self {
        self.sandbox = name.into();
        self
    }

    pub fn build(self) -> Value {
        json!({
            "subcluster_name": self.name,
            "is_default": self.is_default,
            "is_secondary": self.is_secondary,
            "control_set_size": self.control_set_size,
            "sandbox": self.sandbox,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_fixture_builds_expected_shape() {
        let node = NodeFixture::new("v_db_node0001", "10.0.0.1")
            .subcluster("sc1")
            .state("DOWN")
            .build();
        assert_eq!(node["name"], json!("v_db_node0001"));
        assert_eq!(node["subcluster_name"], json!("sc1"));
        assert_eq!(node["state"], json!("DOWN"));
    }

    #[test]
    fn health_fixture_stringifies_pid_flag() {
        let health = HealthFixture::new("UP").vcluster_server_pid_file_exists(true).build();
        assert_eq!(health["vcluster_server_pid_file_exists"], json!("true"));
    }
}
