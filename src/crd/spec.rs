//! # Managed Resource Spec
//!
//! Fields every managed resource spec carries.

use crate::crd::SecretReference;
use serde::{Deserialize, Serialize};

/// What happens to the external resource when its managed resource is deleted
///
/// Read by the reconciler deciding whether to delete; the primitives in this crate ignore it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema,
)]
pub enum DeletionPolicy {
    /// Delete the external resource
    #[default]
    Delete,
    /// Leave the external resource in place
    Orphan,
}

/// Common spec block, flattened into managed resource specs
///
/// # Example
///
/// ```yaml
/// spec:
///   writeConnectionSecretToRef:
///     name: db-1-creds
///     namespace: infra
///   deletionPolicy: Orphan
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// Secret the managed resource publishes its connection details to
    /// Resources that expose no connection details leave this unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
    /// Deletion policy for the external resource
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}
