//! Test tooling (C9 §2.11), feature-gated behind `test-support` so it never
//! ships in the default build. Adapts the teacher's `MockEnterpriseServer` /
//! `fixtures` / `responses` trio from "one client, one base URL" to "one
//! dispatcher, N simulated hosts".
//!
//! # Quick start
//!
//! ```ignore
//! use vertica_opengine::dispatcher::Dispatcher;
//! use vertica_opengine::testing::{fixtures, responses, server::MockCluster};
//!
//! #[tokio::test]
//! async fn example() {
//!     let mut cluster = MockCluster::new();
//!     let h1 = cluster.add_host().await;
//!     cluster
//!         .host(&h1)
//!         .mock("GET", "vertica/version", responses::success(fixtures::VersionFixture::new("v24.1.0").build()))
//!         .await;
//!
//!     let dispatcher = Dispatcher::insecure_for_testing();
//!     // build a ClusterRequest keyed by `h1` and dispatch it...
//! }
//! ```

pub mod fixtures;
pub mod responses;
pub mod server;

pub use server::{MockAgent, MockCluster};
pub use wiremock::{
    matchers::{body_json, method, path, path_regex},
    Mock, MockServer, ResponseTemplate,
};
