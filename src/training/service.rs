//! Entry point used by callers to run a pipeline.

use std::time::Instant;

use crate::common::error::{AppError, GuardResult};
use crate::common::time::elapsed_ms;

use super::domain::{Pipeline, RunReport};

/// Run `pipeline` once, logging start, finish and failure.
///
/// Errors are returned exactly as the pipeline produced them; deciding
/// whether to exit or continue is up to the caller.
pub fn run_pipeline<P: Pipeline + ?Sized>(pipeline: &mut P) -> GuardResult<RunReport> {
    let name = pipeline.name().to_string();
    let started = Instant::now();
    log::info!(target: "trainguard::pipeline", pipeline = name.as_str(); "pipeline started");

    match pipeline.run() {
        Ok(()) => {
            let dur_ms = elapsed_ms(started);
            log::info!(
                target: "trainguard::pipeline",
                pipeline = name.as_str(), dur_ms = dur_ms;
                "pipeline finished"
            );
            Ok(RunReport {
                pipeline: name,
                dur_ms,
            })
        }
        Err(err) => {
            log::error!(
                target: "trainguard::pipeline",
                pipeline = name.as_str(), code = err.code() as u32, dur_ms = elapsed_ms(started);
                "pipeline failed"
            );
            Err(err)
        }
    }
}
