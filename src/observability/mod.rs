//! # Observability
//!
//! Structured logging setup for binaries embedding the runtime.
//!
//! - `logging`: `tracing-subscriber` installation driven by [`ControllerConfig`](crate::config::ControllerConfig)

pub mod logging;

pub use logging::init_tracing;
