//! # Custom Resource Building Blocks
//!
//! Spec types shared by managed resource CRDs and the objects that consume
//! their connection details.
//!
//! ## Module Structure
//!
//! - `references.rs` - Secret references (namespaced and owner-local)
//! - `spec.rs` - Common managed resource spec block and deletion policy

mod references;
mod spec;

// Re-export all public types
pub use references::{LocalSecretReference, SecretReference};
pub use spec::{DeletionPolicy, ResourceSpec};
