//! # In-Memory Object Store
//!
//! [`ObjectStore`] held in process. Objects are kept as JSON so merge
//! patches behave as they do against the API server:
//!
//! - `create` assigns a UID and resource version and fails on an existing key
//! - `update` fails with a conflict when the object's resource version is stale
//! - `patch` applies an RFC 7386 merge patch; a resource version inside the
//!   patch is a precondition
//! - an object with a deletion timestamp disappears once its last finalizer is removed
//!
//! Every call is recorded so tests can assert which writes happened.

use super::{key_of, ObjectStore};
use crate::error::StoreError;
use crate::resource::{ObjectKey, StoredObject};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Kind of store call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Create,
    Update,
    Patch,
}

impl Verb {
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Verb::Get)
    }
}

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub verb: Verb,
    pub kind: String,
    pub key: ObjectKey,
}

type TypeKey = (String, String);

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<(TypeKey, ObjectKey), Value>,
    last_resource_version: u64,
    calls: Vec<StoreCall>,
}

impl State {
    fn next_resource_version(&mut self) -> String {
        self.last_resource_version += 1;
        self.last_resource_version.to_string()
    }

    fn record(&mut self, verb: Verb, kind: &str, key: &ObjectKey) {
        self.calls.push(StoreCall {
            verb,
            kind: kind.to_string(),
            key: key.clone(),
        });
    }

    /// Drop the object when deletion was requested and no finalizer remains
    fn collect_if_deleted(&mut self, slot: &(TypeKey, ObjectKey)) {
        let deletable = self.objects.get(slot).is_some_and(|obj| {
            let metadata = &obj["metadata"];
            !metadata["deletionTimestamp"].is_null() && !has_finalizers(metadata)
        });
        if deletable {
            self.objects.remove(slot);
        }
    }
}

/// Object store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an object without recording a call
    ///
    /// Assigns a UID when the object has none and always assigns a fresh
    /// resource version. Returns the object as stored.
    ///
    /// # Errors
    ///
    /// Fails when the object has no name or namespace or cannot be serialized.
    pub fn insert<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj)?;
        let mut value = serde_json::to_value(obj)?;
        let mut state = self.lock();
        let resource_version = state.next_resource_version();
        let metadata = metadata_mut(&mut value)?;
        if metadata.get("uid").is_none_or(Value::is_null) {
            metadata.insert("uid".to_string(), Value::String(new_uid()));
        }
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(resource_version),
        );
        state
            .objects
            .insert((type_key::<K>(), key), value.clone());
        Ok(serde_json::from_value(value)?)
    }

    /// Read an object without recording a call
    #[must_use]
    pub fn stored<K: StoredObject>(&self, key: &ObjectKey) -> Option<K> {
        let state = self.lock();
        state
            .objects
            .get(&(type_key::<K>(), key.clone()))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Change an object as a concurrent writer would, bumping its resource version
    ///
    /// Returns false when nothing is stored under `key`.
    pub fn modify<K, F>(&self, key: &ObjectKey, mutate: F) -> bool
    where
        K: StoredObject,
        F: FnOnce(&mut K),
    {
        let mut state = self.lock();
        let slot = (type_key::<K>(), key.clone());
        let Some(mut obj) = state
            .objects
            .get(&slot)
            .and_then(|value| serde_json::from_value::<K>(value.clone()).ok())
        else {
            return false;
        };
        mutate(&mut obj);
        obj.meta_mut().resource_version = Some(state.next_resource_version());
        match serde_json::to_value(&obj) {
            Ok(value) => {
                state.objects.insert(slot, value);
                true
            }
            Err(_) => false,
        }
    }

    /// Request deletion of an object
    ///
    /// The object is removed at once when it has no finalizers; otherwise it
    /// gains a deletion timestamp and lingers until the last finalizer is removed.
    pub fn delete<K: StoredObject>(&self, key: &ObjectKey) {
        let mut state = self.lock();
        let slot = (type_key::<K>(), key.clone());
        let resource_version = state.next_resource_version();
        if let Some(metadata) = state
            .objects
            .get_mut(&slot)
            .and_then(|obj| obj.get_mut("metadata"))
            .and_then(Value::as_object_mut)
        {
            metadata
                .entry("deletionTimestamp")
                .or_insert_with(|| Value::String("1970-01-01T00:00:00Z".to_string()));
            metadata.insert(
                "resourceVersion".to_string(),
                Value::String(resource_version),
            );
        }
        state.collect_if_deleted(&slot);
    }

    /// Every call made so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Calls that wrote to the store
    #[must_use]
    pub fn writes(&self) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.verb.is_write())
            .cloned()
            .collect()
    }

    /// Forget recorded calls, keeping stored objects
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get<K: StoredObject>(&self, key: &ObjectKey) -> Result<K, StoreError> {
        let kind = K::kind(&());
        let mut state = self.lock();
        state.record(Verb::Get, &kind, key);
        let value = state
            .objects
            .get(&(type_key::<K>(), key.clone()))
            .cloned()
            .ok_or_else(|| not_found::<K>(key))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj)?;
        let kind = K::kind(&());
        let mut value = serde_json::to_value(obj)?;
        let mut state = self.lock();
        state.record(Verb::Create, &kind, &key);

        let slot = (type_key::<K>(), key);
        if state.objects.contains_key(&slot) {
            return Err(StoreError::Conflict(format!(
                "{kind} {} already exists",
                slot.1
            )));
        }

        let resource_version = state.next_resource_version();
        let metadata = metadata_mut(&mut value)?;
        metadata.insert("uid".to_string(), Value::String(new_uid()));
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(resource_version),
        );
        state.objects.insert(slot, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj)?;
        let kind = K::kind(&());
        let mut value = serde_json::to_value(obj)?;
        let mut state = self.lock();
        state.record(Verb::Update, &kind, &key);

        let slot = (type_key::<K>(), key);
        let (stored_version, stored_uid, deletion_timestamp) = {
            let stored = state
                .objects
                .get(&slot)
                .ok_or_else(|| not_found::<K>(&slot.1))?;
            (
                stored["metadata"]["resourceVersion"].clone(),
                stored["metadata"]["uid"].clone(),
                stored["metadata"]["deletionTimestamp"].clone(),
            )
        };

        if let Some(version) = obj.meta().resource_version.as_deref() {
            if stored_version.as_str() != Some(version) {
                return Err(StoreError::Conflict(format!(
                    "the object has been modified; please apply your changes to the latest version and try again ({kind} {})",
                    slot.1
                )));
            }
        }

        let resource_version = state.next_resource_version();
        let metadata = metadata_mut(&mut value)?;
        metadata.insert("uid".to_string(), stored_uid);
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(resource_version),
        );
        if !deletion_timestamp.is_null() {
            metadata.insert("deletionTimestamp".to_string(), deletion_timestamp);
        }
        state.objects.insert(slot.clone(), value.clone());
        state.collect_if_deleted(&slot);
        Ok(serde_json::from_value(value)?)
    }

    async fn patch<K: StoredObject>(
        &self,
        key: &ObjectKey,
        merge_patch: &[u8],
    ) -> Result<K, StoreError> {
        let kind = K::kind(&());
        let patch: Value = serde_json::from_slice(merge_patch)?;
        let mut state = self.lock();
        state.record(Verb::Patch, &kind, key);

        let slot = (type_key::<K>(), key.clone());
        let mut value = state
            .objects
            .get(&slot)
            .cloned()
            .ok_or_else(|| not_found::<K>(key))?;

        let precondition = &patch["metadata"]["resourceVersion"];
        if precondition.is_string() && *precondition != value["metadata"]["resourceVersion"] {
            return Err(StoreError::Conflict(format!(
                "the object has been modified; please apply your changes to the latest version and try again ({kind} {key})"
            )));
        }

        let uid = value["metadata"]["uid"].clone();
        json_patch::merge(&mut value, &patch);

        let resource_version = state.next_resource_version();
        let metadata = metadata_mut(&mut value)?;
        metadata.insert("uid".to_string(), uid);
        metadata.insert("name".to_string(), Value::String(key.name.clone()));
        metadata.insert(
            "namespace".to_string(),
            Value::String(key.namespace.clone()),
        );
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(resource_version),
        );

        // Decode before storing so a patch producing an invalid object is rejected
        let patched: K = serde_json::from_value(value.clone())?;
        state.objects.insert(slot.clone(), value);
        state.collect_if_deleted(&slot);
        Ok(patched)
    }
}

fn type_key<K: StoredObject>() -> TypeKey {
    (K::api_version(&()).into_owned(), K::kind(&()).into_owned())
}

fn not_found<K: StoredObject>(key: &ObjectKey) -> StoreError {
    StoreError::NotFound {
        kind: K::kind(&()).into_owned(),
        key: key.clone(),
    }
}

fn new_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn has_finalizers(metadata: &Value) -> bool {
    metadata["finalizers"]
        .as_array()
        .is_some_and(|f| !f.is_empty())
}

fn metadata_mut(value: &mut Value) -> Result<&mut serde_json::Map<String, Value>, StoreError> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidObject("object is not a JSON map".to_string()))?;
    object
        .entry("metadata")
        .or_insert_with(|| Value::Object(serde_json::Map::new()))
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidObject("metadata is not a JSON map".to_string()))
}
