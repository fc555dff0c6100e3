//! Shared utilities: error capture, logging, configuration and time.
pub mod config;
pub mod error;
pub mod log;
pub mod time;

pub use error::{ErrorCode, GuardResult, WrappedError};
