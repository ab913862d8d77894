//! # Connection Secrets
//!
//! Builders for the secrets connection details are written to. Each secret
//! is controlled by its owner, so the API server garbage-collects it when
//! the owner is deleted.

use crate::constants::SECRET_TYPE_CONNECTION;
use crate::error::{Error, Result};
use crate::meta;
use crate::resource::{LocalConnectionSecretOwner, Managed};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::api::GroupVersionKind;
use std::collections::BTreeMap;

/// Empty connection secret for a managed resource, at its configured reference
///
/// # Errors
///
/// Returns `InvalidObject` when the resource has no secret reference, name or UID.
pub fn connection_secret_for<M: Managed>(mg: &M, gvk: &GroupVersionKind) -> Result<Secret> {
    let reference = mg.write_connection_secret_to_reference().ok_or_else(|| {
        Error::InvalidObject(format!("{} has no connection secret reference", gvk.kind))
    })?;
    let owner = meta::as_controller(meta::reference_to(mg, gvk)?);
    Ok(connection_secret(
        reference.namespace.clone(),
        reference.name.clone(),
        owner,
    ))
}

/// Empty connection secret in an owner's own namespace
///
/// # Errors
///
/// Returns `InvalidObject` when the owner has no secret reference, name,
/// namespace or UID.
pub fn local_connection_secret_for<O: LocalConnectionSecretOwner>(
    owner: &O,
    gvk: &GroupVersionKind,
) -> Result<Secret> {
    let reference = owner
        .write_local_connection_secret_to_reference()
        .ok_or_else(|| {
            Error::InvalidObject(format!("{} has no connection secret reference", gvk.kind))
        })?;
    let namespace = owner
        .meta()
        .namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| Error::InvalidObject(format!("{} has no namespace", gvk.kind)))?;
    let controller = meta::as_controller(meta::reference_to(owner, gvk)?);
    Ok(connection_secret(
        namespace,
        reference.name.clone(),
        controller,
    ))
}

fn connection_secret(namespace: String, name: String, controller: OwnerReference) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            owner_references: Some(vec![controller]),
            ..ObjectMeta::default()
        },
        type_: Some(SECRET_TYPE_CONNECTION.to_string()),
        data: Some(BTreeMap::new()),
        ..Secret::default()
    }
}
