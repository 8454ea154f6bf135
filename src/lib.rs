//! Operation engine for fanning out administrative requests across a
//! Vertica-style analytic cluster.
//!
//! A cluster-administration workflow (add/remove node, re-IP, rotate TLS,
//! install packages, promote/demote subclusters, ...) is built from small,
//! composable [`operation::Operation`] units. Each operation runs through a
//! fixed four-phase lifecycle — `prepare`, `execute`, `process_result`,
//! `finalize` — against a shared [`context::ExecutionContext`], and the
//! [`engine::OperationEngine`] sequences a list of them, aggregating
//! per-host failures and guaranteeing cleanup even on error.
//!
//! Requests fan out in parallel to two per-host agents: the **Node
//! Management Agent (NMA)**, reachable even when the database itself is
//! down, and the **HTTPS database service**, only reachable while the
//! database is running. [`dispatcher::Dispatcher`] owns that fan-out and
//! classifies every response into a [`result::HostResult`].
//!
//! # Quick start
//!
//! ```no_run
//! use vertica_opengine::config::EngineConfig;
//! use vertica_opengine::context::ExecutionContext;
//! use vertica_opengine::dispatcher::Dispatcher;
//! use vertica_opengine::engine::OperationEngine;
//! use vertica_opengine::ops::CheckNmaHealth;
//! use vertica_opengine::topology::Host;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Arc::new(Dispatcher::new());
//! let mut ctx = ExecutionContext::new(dispatcher);
//! let hosts = vec![Host::parse("10.0.0.1")?, Host::parse("10.0.0.2")?];
//!
//! // `from_config` wires the engine's TLS policy into every request an
//! // operation registers; `OperationEngine::new()` leaves it unset, which
//! // the dispatcher then treats as insecure.
//! let config = EngineConfig::from_env();
//! let engine = OperationEngine::from_config(&config);
//! let operations: Vec<Box<dyn vertica_opengine::operation::Operation>> =
//!     vec![Box::new(CheckNmaHealth::new(hosts))];
//! engine.run(&mut ctx, operations).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module organization
//!
//! - [`error`] — the [`error::OperationError`] taxonomy shared by every
//!   layer below.
//! - [`tls`] / [`endpoints`] / [`request`] / [`result`] — the per-request
//!   vocabulary: TLS policy, known NMA/HTTPS-DB paths, a single outbound
//!   call, and its classified outcome.
//! - [`masking`] — sensitive-field redaction applied before any `tracing`
//!   call logs a request body.
//! - [`cluster_request`] / [`dispatcher`] — the parallel fan-out unit and
//!   the `reqwest`/`tokio::task::JoinSet`-backed executor that fills it in.
//! - [`topology`] / [`context`] — the in-memory cluster view and the
//!   per-run blackboard threaded through an engine run.
//! - [`operation`] — the `Operation` trait, [`operation::base::OperationBase`]
//!   shared state, and the [`operation::polling`] framework for operations
//!   that must retry until a condition holds.
//! - [`config`] — [`config::EngineConfig`], environment-driven defaults for
//!   timeouts.
//! - [`engine`] — [`engine::OperationEngine`], the sequencer described above.
//! - [`ops`] — concrete operations, one module per representative fan-out
//!   shape.
//! - [`workflows`] — ordered operation pipelines exposed as single public
//!   entry points, one per admin action.
//! - [`testing`] (behind the `test-support` feature) — `wiremock`-backed
//!   multi-host mock infrastructure for exercising the above without a real
//!   cluster.

pub mod cluster_request;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod masking;
pub mod operation;
pub mod ops;
pub mod request;
pub mod result;
pub mod tls;
pub mod topology;
pub mod workflows;

#[cfg(feature = "test-support")]
pub mod testing;

pub use config::EngineConfig;
pub use context::ExecutionContext;
pub use dispatcher::Dispatcher;
pub use engine::OperationEngine;
pub use error::{OperationError, Result};
pub use operation::{Operation, OperationBase};
pub use topology::{Host, Topology};
