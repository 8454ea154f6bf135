//! Concrete operations (C3 specialisations), one module per representative
//! operation shape from §4.3: fan-out-to-all + join, fan-out-to-all +
//! first-success, initiator-only, host-selection-by-topology, and the
//! polling variant (C6).

pub mod check_nma_health;
pub mod check_subcluster_sandboxing;
pub mod check_vcluster_server_pid;
pub mod check_vertica_version;
pub mod create_depot;
pub mod degrade_k_safety;
pub mod get_cluster_info;
pub mod install_packages;
pub mod poll_https_health;
pub mod poll_node_state;
pub mod promote_subcluster;
pub mod reip;
pub mod remove_node;
pub mod rotate_tls_certs;

pub use check_nma_health::CheckNmaHealth;
pub use check_subcluster_sandboxing::{CheckSubclusterSandboxing, SandboxBuckets};
pub use check_vcluster_server_pid::CheckVclusterServerPid;
pub use check_vertica_version::CheckVerticaVersion;
pub use create_depot::CreateDepot;
pub use degrade_k_safety::DegradeKSafety;
pub use get_cluster_info::{ClusterInfo, GetClusterInfo};
pub use install_packages::InstallPackages;
pub use poll_https_health::PollHttpsHealth;
pub use poll_node_state::PollNodeState;
pub use promote_subcluster::PromoteSubcluster;
pub use reip::{ReIp, ReIpEntry};
pub use remove_node::RemoveNode;
pub use rotate_tls_certs::RotateTlsCerts;
