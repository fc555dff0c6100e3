//! Contracts between the core and training pipelines.

use crate::common::error::GuardResult;

/// A runnable training pipeline.
///
/// Failures must already be decorated at the fault site (see
/// [`ResultExt::wrap_err`](crate::common::error::ResultExt::wrap_err)) so the
/// reported location is where the fault happened, not where it surfaced.
pub trait Pipeline {
    fn name(&self) -> &str;

    fn run(&mut self) -> GuardResult<()>;
}

/// One step of a [`StagePipeline`](super::StagePipeline).
pub trait Stage {
    fn name(&self) -> &str;

    fn execute(&mut self) -> GuardResult<()>;
}

/// Outcome of a successful run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    pub pipeline: String,
    pub dur_ms: u64,
}
