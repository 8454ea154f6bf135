//! Workflows (§4.4): ordered pipelines of operations run through a single
//! [`crate::engine::OperationEngine`], each returning a [`WorkflowReport`]
//! recording when the run started and finished.
//!
//! Grounded on the teacher's top-level handler modules (`cluster.rs`,
//! `nodes.rs`), which exposed one public async function per admin action
//! that internally sequenced several REST calls; here the same "one public
//! entry point per admin action" shape sequences operations through the
//! engine instead of calling a single REST client method.

pub mod install_packages;
pub mod promote_subcluster;
pub mod reip;
pub mod remove_node;
pub mod rotate_tls;
pub mod sandbox;

use chrono::{DateTime, Utc};

/// Wall-clock bookkeeping for one workflow invocation, independent of the
/// per-operation spinner state the engine already tracks.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub succeeded: bool,
}

impl WorkflowReport {
    pub fn start(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            started_at: now,
            finished_at: None,
            succeeded: false,
        }
    }

    pub fn finish(mut self, now: DateTime<Utc>, succeeded: bool) -> Self {
        self.finished_at = Some(now);
        self.succeeded = succeeded;
        self
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_is_none_until_finished() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = WorkflowReport::start("reip", start);
        assert!(report.duration().is_none());

        let end = start + chrono::Duration::seconds(5);
        let report = report.finish(end, true);
        assert_eq!(report.duration(), Some(chrono::Duration::seconds(5)));
        assert!(report.succeeded);
    }
}
