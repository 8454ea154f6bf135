//! Endpoint path constants for the two agent services (§6.1).
//!
//! [`crate::request::Request::nma`] and [`crate::request::Request::https_db`]
//! prepend the appropriate root to whatever path is passed here, so callers
//! write e.g. `Request::nma(nma::HEALTH)` rather than hand-assembling
//! `"v1/health"`.

/// API root prepended to every NMA endpoint.
pub const NMA_API_ROOT: &str = "v1/";

/// API root prepended to every HTTPS database service endpoint.
pub const HTTPS_API_ROOT: &str = "v1/";

/// Node Management Agent endpoints known to the core (§6.1).
pub mod nma {
    pub const VERTICA_VERSION: &str = "vertica/version";
    pub const ROTATE_CERTS: &str = "vertica/https/rotate-certs";
    pub const NODES_START: &str = "nodes/start";
    pub const DIRECTORIES_DELETE: &str = "directories/delete";
    pub const CATALOG_REIP: &str = "catalog/re-ip";
    pub const CONNECTIONS_ACTIVE: &str = "connections/active";
    pub const CONNECTIONS_ACTIVE_DETAILS: &str = "connections/active/details";
    pub const HEALTH: &str = "health";
    pub const HEALTH_VCLUSTER_SERVER: &str = "health/vcluster-server";
    pub const EPOCH_INFO: &str = "epoch-info";
    pub const HEALTH_WATCHDOG_SET: &str = "health-watchdog/set";
    pub const SHUTDOWN: &str = "nma/shutdown";
    pub const RESTART: &str = "nma/restart";
    pub const DC_MISSING_RELEASES: &str = "dc/missing-releases";
}

/// HTTPS database service endpoints known to the core (§6.1); only reachable
/// while the database itself is running.
pub mod https_db {
    pub const NODES: &str = "nodes";
    pub const SUBCLUSTERS: &str = "subclusters";
    pub const CLUSTER: &str = "cluster";
    pub const CLUSTER_DEPOT: &str = "cluster/depot";
    pub const CLUSTER_CATALOG_SYNC: &str = "cluster/catalog/sync";
    pub const CLUSTER_KSAFETY_DEGRADE: &str = "cluster/k-safety/degrade";
    pub const CONFIG_SPREAD_RELOAD: &str = "config/spread/reload";
    pub const CONFIG_SPREAD_REMOVE: &str = "config/spread/remove";
    pub const STARTUP_COMMANDS: &str = "startup/commands";
    pub const PACKAGES: &str = "packages";
    pub const HEALTH: &str = "health";
    pub const SANDBOX_CONVERT: &str = "sandbox/convert";
    pub const DC_TRANSACTION_STARTS: &str = "dc/transaction-starts";

    pub fn node_depot(node_name: &str) -> String {
        format!("nodes/{node_name}/depot")
    }

    pub fn subcluster_promote(name: &str) -> String {
        format!("subclusters/{name}/promote")
    }

    pub fn subcluster_demote(name: &str) -> String {
        format!("subclusters/{name}/demote")
    }

    pub fn subcluster_rename(name: &str) -> String {
        format!("subclusters/{name}/rename")
    }
}
