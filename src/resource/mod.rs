//! # Resources
//!
//! Capability traits every stored object satisfies, the object store and
//! type resolver collaborators, and the primitives built on them: the two
//! applicators, apply options, connection secret builders and the
//! connection propagator.
//!
//! ## Module Structure
//!
//! - `store/` - `ObjectStore` trait, `KubeStore` and `MemoryStore`
//! - `typer.rs` - `TypeResolver` trait and `StaticTypeResolver`
//! - `apply/` - `Applicator` trait, patching and updating variants, apply options
//! - `secret.rs` - Connection secret builders
//! - `propagator.rs` - Connection secret propagation between owners

pub mod apply;
pub mod propagator;
pub mod secret;
pub mod store;
pub mod typer;

pub use apply::{
    connection_secret_must_be_controllable_by, must_be_controllable_by, Applicator,
    ApplyOption, PatchingApplicator, UpdatingApplicator,
};
pub use propagator::{ApiManagedConnectionPropagator, ConnectionPropagator};
pub use secret::{connection_secret_for, local_connection_secret_for};
pub use store::{KubeStore, MemoryStore, ObjectStore, StoreCall, Verb};
pub use typer::{StaticTypeResolver, TypeResolver};

use crate::crd::{LocalSecretReference, SecretReference};
use crate::error::{Error, Result};
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Namespace and name of a stored object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an object from its metadata
    ///
    /// # Errors
    ///
    /// Returns `InvalidObject` when the name or namespace is missing.
    pub fn of<K: Resource<DynamicType = ()>>(obj: &K) -> Result<Self> {
        let meta = obj.meta();
        let name = meta
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::InvalidObject(format!("cannot access {} metadata: no name", K::kind(&())))
            })?;
        let namespace = meta
            .namespace
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::InvalidObject(format!(
                    "cannot access {} {name} metadata: no namespace",
                    K::kind(&())
                ))
            })?;
        Ok(Self::new(namespace, name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Any namespaced object the store can read and write
///
/// Identity, UID, annotations, finalizers and owner references are read
/// through [`kube::Resource::meta`], so every `k8s-openapi` type and every
/// `#[derive(CustomResource)]` type with `namespaced` qualifies.
pub trait StoredObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// A managed resource: a request for an externally-provisioned resource
pub trait Managed: StoredObject {
    /// Secret the resource publishes connection details to, if any
    fn write_connection_secret_to_reference(&self) -> Option<&SecretReference>;
}

/// An object that wants connection details copied into its own namespace
pub trait LocalConnectionSecretOwner: StoredObject {
    /// Secret in the owner's namespace to receive connection details, if any
    fn write_local_connection_secret_to_reference(&self) -> Option<&LocalSecretReference>;
}
