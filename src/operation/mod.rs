//! The operation contract (C3): a polymorphic unit of work with four
//! lifecycle hooks, invoked by the engine in a fixed order (§4.3, §4.5).

pub mod base;
pub mod polling;

pub use base::{OperationBase, Spinner};
pub use polling::{poll_state, Pollable};

use crate::context::ExecutionContext;
use crate::error::Result;
use async_trait::async_trait;

/// Implemented once per concrete operation. `execute` has a default body
/// (dispatch then `process_result`) that every operation should inherit;
/// only operations with unusual fan-out strategies override it.
#[async_trait]
pub trait Operation: Send {
    fn base(&self) -> &OperationBase;
    fn base_mut(&mut self) -> &mut OperationBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn description(&self) -> &str {
        &self.base().description
    }

    fn is_skip_execute(&self) -> bool {
        self.base().skip_execute
    }

    /// Read `ctx`, decide the final host list and per-host requests, and
    /// set `skip_execute` if there is nothing to do. May fail; failure
    /// aborts the workflow (§4.3 step 1).
    async fn prepare(&mut self, ctx: &mut ExecutionContext) -> Result<()>;

    /// Dispatch the populated cluster request and hand the results to
    /// `process_result`. Skipped entirely by the engine when `skip_execute`
    /// is set (P5).
    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<()> {
        let dispatcher = ctx.dispatcher.clone();
        dispatcher.dispatch(&mut self.base_mut().cluster_request).await;
        self.process_result(ctx).await
    }

    /// Parse results, aggregate errors (join-all or first-success-wins per
    /// the operation's contract), write outputs to `ctx` (§4.3 step 4).
    async fn process_result(&mut self, ctx: &mut ExecutionContext) -> Result<()>;

    /// Cleanup; always called, even if prior phases failed, so UI/spinner
    /// state is restored (§4.3 step 5). Must be idempotent (engine
    /// algorithm note, §4.5).
    async fn finalize(&mut self, _ctx: &mut ExecutionContext) -> Result<()> {
        Ok(())
    }
}
