//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use managed_runtime::prelude::*;
//! ```
//!
//! This brings into scope:
//! - CRD building blocks (ResourceSpec, SecretReference, etc.)
//! - Capability traits and the object store
//! - Applicators, apply options and the connection propagator
//! - Lifecycle helpers (finalizer, initializer, publisher)
//! - Config and error types

// CRD building blocks - embedded in managed resource specs
pub use crate::crd::*;

// Capability traits and collaborators
pub use crate::resource::{
    KubeStore, LocalConnectionSecretOwner, Managed, MemoryStore, ObjectKey, ObjectStore,
    StaticTypeResolver, StoredObject, TypeResolver,
};

// Primitives
pub use crate::resource::{
    connection_secret_must_be_controllable_by, must_be_controllable_by,
    ApiManagedConnectionPropagator, Applicator, ApplyOption, ConnectionPropagator,
    PatchingApplicator, UpdatingApplicator,
};

// Lifecycle helpers
pub use crate::managed::{
    ApiFinalizer, ApiSecretPublisher, ConnectionDetails, ConnectionPublisher, Finalizer,
    Initializer, NameAsExternalName, NopConnectionPublisher, NopFinalizer, NopInitializer,
};

// Config types
pub use crate::config::ControllerConfig;

// Common error types
pub use crate::error::{Error, ErrorKind, Result, StoreError};
