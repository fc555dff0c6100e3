//! Training pipeline interface.
//!
//! Pipeline internals live outside this crate; the core only defines how a
//! pipeline is run and how its failures reach the caller.

pub mod domain;
pub mod service;
pub mod stages;

pub use domain::{Pipeline, RunReport, Stage};
pub use service::run_pipeline;
pub use stages::StagePipeline;
