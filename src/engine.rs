//! The operation engine (C5 §4.5): sequences a list of operations against a
//! shared context, exactly as described in the engine algorithm — the
//! engine is the only place that knows about spinners, TLS wiring, and host
//! filtering, so operations see a clean callback surface.

use crate::config::EngineConfig;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::operation::Operation;
use crate::tls::TlsOptions;
use tracing::{debug, error, info};

/// Runs an ordered list of operations against one [`ExecutionContext`].
pub struct OperationEngine {
    tls_options: Option<TlsOptions>,
}

impl OperationEngine {
    pub fn new() -> Self {
        Self { tls_options: None }
    }

    pub fn with_tls_options(mut self, options: TlsOptions) -> Self {
        self.tls_options = Some(options);
        self
    }

    /// Build an engine whose TLS policy is derived from `config` (§2.10):
    /// every request dispatched through a run gets `config.tls_options()`
    /// applied during `applyTLSOptions`, rather than falling back to the
    /// dispatcher's insecure default.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new().with_tls_options(config.tls_options())
    }

    /// Run every operation in order, stopping at the first fatal error.
    /// `finalize` is always called for every operation that was ever
    /// started or skipped, even on failure, so UI/spinner state and any
    /// held resources are released.
    pub async fn run(
        &self,
        ctx: &mut ExecutionContext,
        mut operations: Vec<Box<dyn Operation>>,
    ) -> Result<()> {
        debug!(count = operations.len(), "starting engine run");
        for index in 0..operations.len() {
            let op = &mut operations[index];
            op.base_mut().spinner.start(op.description().to_string());
            op.base_mut().filter_unreachable_hosts(ctx);
            op.base_mut().filter_hosts_by_sandbox(ctx);

            if let Err(err) = op.prepare(ctx).await {
                op.base_mut().spinner.fail(err.to_string());
                error!(operation = op.name(), %err, "prepare failed");
                // Per the engine algorithm, a prepare failure still finalizes
                // every not-yet-run operation, in reverse order, before
                // returning — the same "finalize is always called" contract
                // as a normal run, just walked backwards from the failure.
                for remaining in operations[index..].iter_mut().rev() {
                    let _ = remaining.finalize(ctx).await;
                }
                return Err(err);
            }

            if let Some(options) = &self.tls_options {
                op.base_mut().apply_tls_options(options);
            }

            if !op.is_skip_execute() {
                if let Err(err) = op.execute(ctx).await {
                    op.base_mut().spinner.fail(err.to_string());
                    error!(operation = op.name(), %err, "execute failed");
                    for remaining in operations[index..].iter_mut() {
                        let _ = remaining.finalize(ctx).await;
                    }
                    return Err(err);
                }
            }

            op.base_mut().spinner.succeed(op.description().to_string());
            op.finalize(ctx).await?;
            info!(operation = op.name(), "operation complete");
        }
        Ok(())
    }
}

impl Default for OperationEngine {
    fn default() -> Self {
        Self::new()
    }
}
