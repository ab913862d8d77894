//! # Configuration
//!
//! Runtime configuration loaded from environment variables.

mod controller;

pub use controller::ControllerConfig;
