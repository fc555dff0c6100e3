// lib.rs - error capture core for the training pipeline
pub mod common;
pub mod training;

pub use common::error::{
    describe_error, AppError, DiagnosticMessage, ErrorContext, FaultError, ResultExt,
    WrappedError,
};
pub use training::{run_pipeline, Pipeline};
