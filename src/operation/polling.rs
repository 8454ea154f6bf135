//! The polling framework (C6 §4.6): one shared driver, rather than a
//! hand-rolled retry loop duplicated in every polling operation (§9 design
//! note). Grounded on the shape of `src/actions.rs`'s `Action::status`
//! polling target (`queued`/`running`/`completed`/`failed`), generalized
//! into a reusable driver that re-dispatches on an interval instead of a
//! one-off `get()`.

use crate::context::ExecutionContext;
use crate::error::{OperationError, Result};
use crate::operation::Operation;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default interval between polling attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The capability an operation exposes to drive `poll_state`: a verdict
/// function plus how long to keep trying.
#[async_trait]
pub trait Pollable: Operation {
    /// `(done, err)`:
    /// - `(true, None)` — success, stop polling.
    /// - `(true, Some(err))` — fatal, stop polling and report `err`.
    /// - `(false, None)` — keep polling.
    ///
    /// Called after each re-dispatch with the freshly populated results
    /// still on the operation's cluster request.
    async fn should_stop_polling(&mut self, ctx: &mut ExecutionContext) -> (bool, Option<OperationError>);

    /// How long `poll_state` may keep retrying before giving up.
    fn polling_timeout(&self) -> Duration;

    /// How long to sleep between polling attempts. Defaults to one second.
    fn polling_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// The hosts this poll is still waiting to hear a done verdict from,
    /// used to build a descriptive timeout error.
    fn pending_hosts(&self) -> Vec<String> {
        self.base().hosts.iter().map(|h| h.to_string()).collect()
    }
}

/// Repeatedly re-dispatch `op`'s cluster request and ask
/// `should_stop_polling` for a verdict, subject to `op.polling_timeout()`
/// (P6).
pub async fn poll_state<P: Pollable + ?Sized>(op: &mut P, ctx: &mut ExecutionContext) -> Result<()> {
    let timeout = op.polling_timeout();
    let interval = op.polling_interval();
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let dispatcher = ctx.dispatcher.clone();
        dispatcher.dispatch(&mut op.base_mut().cluster_request).await;

        let (done, err) = op.should_stop_polling(ctx).await;
        match (done, err) {
            (true, None) => return Ok(()),
            (true, Some(err)) => return Err(err),
            (false, _) => {}
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(OperationError::PollingTimeout {
                operation: op.name().to_string(),
                timeout_secs: timeout.as_secs(),
                pending_hosts: op.pending_hosts(),
            });
        }

        debug!(operation = op.name(), "polling: not done yet, sleeping");
        tokio::time::sleep(interval).await;
    }
}
