//! Managed Resource Runtime Library
//!
//! Reconciliation primitives for controllers that manage external resources
//! through Kubernetes objects: create-or-merge applicators, ownership-checked
//! connection secret propagation, finalizer and external-name lifecycle
//! helpers, and connection detail publishing.
//!
//! Every primitive talks to the API server through an [`ObjectStore`]
//! (`KubeStore` in production, `MemoryStore` in tests), performs no retries
//! and returns a single error describing the step that failed.
//!
//! ## Quick Start
//!
//! ```rust
//! use managed_runtime::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.
//!
//! [`ObjectStore`]: resource::ObjectStore

pub mod config;
pub mod constants;
pub mod crd;
pub mod error;
pub mod managed;
pub mod meta;
pub mod observability;
pub mod prelude;
pub mod resource;
