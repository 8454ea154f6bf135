//! End-to-end dispatch tests against real `wiremock` agents standing in for
//! NMA/HTTPS-DB hosts.
//!
//! These exercise `Dispatcher::dispatch` directly against `ClusterRequest`s
//! keyed by a mock agent's `host:port` authority, rather than going through
//! the `Operation`/`Host` type layer: `Host::parse` only accepts resolved
//! IP literals (P7), so a `host:port` authority never becomes a `Host`. The
//! operation-level unit tests in `src/ops/*.rs` cover `prepare`/
//! `process_result` logic against hand-built `HostResult`s instead; this
//! file covers the actual HTTP fan-out, response classification, and
//! per-host result aggregation that those unit tests can't reach.

#![cfg(feature = "test-support")]

use vertica_opengine::cluster_request::{ApiVersion, ClusterRequest};
use vertica_opengine::dispatcher::Dispatcher;
use vertica_opengine::request::{Method, Request};
use vertica_opengine::result::ResultStatus;
use vertica_opengine::testing::server::MockCluster;
use vertica_opengine::testing::{fixtures, responses};

/// Enables `tracing` output for whichever test calls it, so a failure shows
/// the dispatcher's `debug!`/`info!` spans instead of just the assertion
/// message. Safe to call from more than one test: `try_init` ignores the
/// "already initialized" error from a prior test in the same binary.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}

#[tokio::test]
async fn fans_out_to_every_host_and_collects_all_results() {
    init_tracing();
    let mut cluster = MockCluster::new();
    let h1 = cluster.add_host().await;
    let h2 = cluster.add_host().await;
    let h3 = cluster.add_host().await;

    for h in [&h1, &h2, &h3] {
        cluster
            .host(h)
            .mock(
                "GET",
                "vertica/health",
                responses::success(fixtures::HealthFixture::new("UP").build()),
            )
            .await;
    }

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("check_nma_health", ApiVersion::new(1, 0, 0));
    for h in [&h1, &h2, &h3] {
        cr.set_request(h.clone(), Request::nma(Method::Get, "vertica/health"));
    }

    dispatcher.dispatch(&mut cr).await;

    assert!(cr.has_complete_results());
    for h in [&h1, &h2, &h3] {
        let result = cr.results.get(h).expect("result for dispatched host");
        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.is_passing());
    }
}

#[tokio::test]
async fn a_failing_host_does_not_block_the_others_result() {
    let mut cluster = MockCluster::new();
    let up = cluster.add_host().await;
    let down = cluster.add_host().await;

    cluster
        .host(&up)
        .mock(
            "GET",
            "vertica/health",
            responses::success(fixtures::HealthFixture::new("UP").build()),
        )
        .await;
    cluster
        .host(&down)
        .mock("GET", "vertica/health", responses::server_error("catalog locked"))
        .await;

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("check_nma_health", ApiVersion::new(1, 0, 0));
    cr.set_request(up.clone(), Request::nma(Method::Get, "vertica/health"));
    cr.set_request(down.clone(), Request::nma(Method::Get, "vertica/health"));

    dispatcher.dispatch(&mut cr).await;

    assert!(cr.has_complete_results());
    assert!(cr.results.get(&up).unwrap().is_passing());
    let failed = cr.results.get(&down).unwrap();
    assert!(!failed.is_passing());
    assert_eq!(failed.http_status, 500);
}

#[tokio::test]
async fn a_401_response_is_classified_as_unauthorized() {
    let mut cluster = MockCluster::new();
    let h1 = cluster.add_host().await;
    cluster
        .host(&h1)
        .mock("GET", "nodes", responses::unauthorized())
        .await;

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("get_cluster_info", ApiVersion::new(1, 0, 0));
    cr.set_request(h1.clone(), Request::https_db(Method::Get, "nodes"));

    dispatcher.dispatch(&mut cr).await;

    let result = cr.results.get(&h1).unwrap();
    assert!(result.is_unauthorized());
    assert!(!result.is_passing());
}

#[tokio::test]
async fn a_wrong_credentials_401_is_distinguished_from_a_generic_401() {
    let mut cluster = MockCluster::new();
    let h1 = cluster.add_host().await;
    cluster
        .host(&h1)
        .mock("GET", "nodes", responses::wrong_credentials())
        .await;

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("get_cluster_info", ApiVersion::new(1, 0, 0));
    cr.set_request(h1.clone(), Request::https_db(Method::Get, "nodes"));

    dispatcher.dispatch(&mut cr).await;

    let result = cr.results.get(&h1).unwrap();
    assert!(result.is_unauthorized());
    assert!(result.is_password_or_cert_error());
}

#[tokio::test]
async fn a_request_past_its_timeout_is_classified_as_a_timeout() {
    use std::time::Duration;

    let mut cluster = MockCluster::new();
    let h1 = cluster.add_host().await;
    cluster
        .host(&h1)
        .mock(
            "GET",
            "vertica/health",
            responses::delayed(
                responses::success(fixtures::HealthFixture::new("UP").build()),
                Duration::from_millis(300),
            ),
        )
        .await;

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("check_nma_health", ApiVersion::new(1, 0, 0));
    let request = Request::nma(Method::Get, "vertica/health").with_timeout(Duration::from_millis(50));
    cr.set_request(h1.clone(), request);

    dispatcher.dispatch(&mut cr).await;

    let result = cr.results.get(&h1).unwrap();
    assert!(result.is_timeout());
}

#[tokio::test]
async fn basic_auth_credentials_reach_the_https_db_agent() {
    use vertica_opengine::request::Credentials;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, ResponseTemplate};

    let mut cluster = MockCluster::new();
    let h1 = cluster.add_host().await;
    cluster
        .host(&h1)
        .mount(
            Mock::given(method("POST"))
                .and(path("/v1/nodes/10.0.0.1/depot"))
                .and(basic_auth("dbadmin", "s3cret"))
                .respond_with(ResponseTemplate::new(201)),
        )
        .await;

    let dispatcher = Dispatcher::insecure_for_testing();
    let mut cr = ClusterRequest::new("create_depot", ApiVersion::new(1, 0, 0));
    let request = Request::https_db(Method::Post, "nodes/10.0.0.1/depot")
        .with_credentials(Credentials::new("dbadmin", Some("s3cret".to_string())));
    cr.set_request(h1.clone(), request);

    dispatcher.dispatch(&mut cr).await;

    let result = cr.results.get(&h1).unwrap();
    assert!(result.is_passing());
}
