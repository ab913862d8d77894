//! # Object Store
//!
//! The versioned object store collaborator the primitives read from and
//! write to.
//!
//! - `kube_store.rs` - `KubeStore`, backed by the Kubernetes API server
//! - `memory.rs` - `MemoryStore`, an in-process store with the same
//!   resource version and merge patch semantics

mod kube_store;
mod memory;

pub use kube_store::KubeStore;
pub use memory::{MemoryStore, StoreCall, Verb};

use crate::error::StoreError;
use crate::resource::{ObjectKey, StoredObject};
use async_trait::async_trait;

/// Get, create, update and patch against a versioned object store
///
/// Every call returns the object as stored after the call, so callers
/// observe store-assigned UIDs and resource versions.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the object stored under `key`
    ///
    /// Fails with [`StoreError::NotFound`] when nothing is stored there.
    async fn get<K: StoredObject>(&self, key: &ObjectKey) -> Result<K, StoreError>;

    /// Create the object; the store assigns its UID and resource version
    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Replace the whole object
    ///
    /// When the object carries a resource version that no longer matches
    /// the stored one, fails with [`StoreError::Conflict`].
    async fn update<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError>;

    /// Apply a JSON merge patch (RFC 7386) to the object stored under `key`
    async fn patch<K: StoredObject>(
        &self,
        key: &ObjectKey,
        merge_patch: &[u8],
    ) -> Result<K, StoreError>;
}

/// Key of an object about to be written
fn key_of<K: StoredObject>(obj: &K) -> Result<ObjectKey, StoreError> {
    ObjectKey::of(obj).map_err(|e| StoreError::InvalidObject(e.to_string()))
}
