//! # Secret References
//!
//! Where connection details are written.

use crate::resource::ObjectKey;
use serde::{Deserialize, Serialize};

/// Reference to a secret in an explicit namespace
///
/// Used by managed resources, which may publish connection details outside
/// their own namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Name of the secret
    pub name: String,
    /// Namespace of the secret
    pub namespace: String,
}

impl SecretReference {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Store key of the referenced secret
    #[must_use]
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.namespace, &self.name)
    }
}

/// Reference to a secret in the namespace of the referencing object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalSecretReference {
    /// Name of the secret
    pub name: String,
}

impl LocalSecretReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
