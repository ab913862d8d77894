//! # Object Metadata Helpers
//!
//! Pure functions over `ObjectMeta`: finalizers, annotations, the external
//! name, owner references and propagation markers. Nothing here talks to the
//! API server.

use crate::constants::{
    ANNOTATION_EXTERNAL_NAME, ANNOTATION_PROPAGATE_FROM_NAME, ANNOTATION_PROPAGATE_FROM_NAMESPACE,
    ANNOTATION_PROPAGATE_FROM_UID, ANNOTATION_PROPAGATE_TO_PREFIX,
};
use crate::error::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::GroupVersionKind;
use kube::Resource;

/// Whether the object carries the finalizer
pub fn finalizer_exists<K: Resource>(obj: &K, finalizer: &str) -> bool {
    obj.meta()
        .finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == finalizer))
}

/// Add the finalizer unless it is already present
pub fn add_finalizer<K: Resource>(obj: &mut K, finalizer: &str) {
    if finalizer_exists(obj, finalizer) {
        return;
    }
    obj.meta_mut()
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(finalizer.to_string());
}

/// Remove every occurrence of the finalizer
pub fn remove_finalizer<K: Resource>(obj: &mut K, finalizer: &str) {
    if let Some(finalizers) = obj.meta_mut().finalizers.as_mut() {
        finalizers.retain(|f| f != finalizer);
    }
}

/// Add or overwrite annotations
pub fn add_annotations<K, I, A, B>(obj: &mut K, annotations: I)
where
    K: Resource,
    I: IntoIterator<Item = (A, B)>,
    A: Into<String>,
    B: Into<String>,
{
    let existing = obj.meta_mut().annotations.get_or_insert_with(Default::default);
    for (key, value) in annotations {
        existing.insert(key.into(), value.into());
    }
}

/// External name annotation, if set and non-empty
pub fn external_name<K: Resource>(obj: &K) -> Option<&str> {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|a| a.get(ANNOTATION_EXTERNAL_NAME))
        .map(String::as_str)
        .filter(|name| !name.is_empty())
}

pub fn set_external_name<K: Resource>(obj: &mut K, name: &str) {
    add_annotations(obj, [(ANNOTATION_EXTERNAL_NAME, name)]);
}

/// The owner reference marked as controller, if any
pub fn controller_of<K: Resource>(obj: &K) -> Option<&OwnerReference> {
    obj.meta()
        .owner_references
        .as_ref()?
        .iter()
        .find(|r| r.controller == Some(true))
}

/// Whether the object's controller reference carries `uid`
pub fn is_controlled_by<K: Resource>(obj: &K, uid: &str) -> bool {
    !uid.is_empty() && controller_of(obj).is_some_and(|c| c.uid == uid)
}

/// Build an owner reference pointing at `obj`
///
/// # Errors
///
/// Returns `InvalidObject` when the object has no name or UID yet, which is
/// the case before the store has created it.
pub fn reference_to<K: Resource>(obj: &K, gvk: &GroupVersionKind) -> Result<OwnerReference> {
    let meta = obj.meta();
    let name = meta
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidObject(format!("{} has no name", gvk.kind)))?;
    let uid = meta
        .uid
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Error::InvalidObject(format!("{} {name} has no UID", gvk.kind)))?;
    Ok(OwnerReference {
        api_version: gvk.api_version(),
        kind: gvk.kind.clone(),
        name,
        uid,
        ..OwnerReference::default()
    })
}

/// Mark an owner reference as the controlling, deletion-blocking owner
#[must_use]
pub fn as_controller(reference: OwnerReference) -> OwnerReference {
    OwnerReference {
        controller: Some(true),
        block_owner_deletion: Some(true),
        ..reference
    }
}

/// Annotation key on a source secret allowing propagation to a destination
/// owned by `owner_uid`
#[must_use]
pub fn propagate_to_key(owner_uid: &str) -> String {
    format!("{ANNOTATION_PROPAGATE_TO_PREFIX}/{owner_uid}")
}

/// Record that `to` may receive a copy of `from`
///
/// The destination learns which secret it was copied from; the source
/// records the destination keyed by the UID of the destination's owner,
/// which is stable before the destination itself exists.
pub fn allow_propagation<F, T>(from: &mut F, to: &mut T, to_owner_uid: &str)
where
    F: Resource,
    T: Resource,
{
    let from_meta = from.meta();
    let from_annotations = [
        (
            ANNOTATION_PROPAGATE_FROM_NAMESPACE,
            from_meta.namespace.clone().unwrap_or_default(),
        ),
        (
            ANNOTATION_PROPAGATE_FROM_NAME,
            from_meta.name.clone().unwrap_or_default(),
        ),
        (
            ANNOTATION_PROPAGATE_FROM_UID,
            from_meta.uid.clone().unwrap_or_default(),
        ),
    ];
    add_annotations(to, from_annotations);

    let to_meta = to.meta();
    let destination = format!(
        "{}/{}",
        to_meta.namespace.as_deref().unwrap_or_default(),
        to_meta.name.as_deref().unwrap_or_default()
    );
    add_annotations(from, [(propagate_to_key(to_owner_uid), destination)]);
}

/// Whether `from` allows propagation to the destination owned by `to_owner_uid`
pub fn allows_propagation_to<K: Resource>(from: &K, to_owner_uid: &str) -> bool {
    from.meta()
        .annotations
        .as_ref()
        .is_some_and(|a| a.contains_key(&propagate_to_key(to_owner_uid)))
}
