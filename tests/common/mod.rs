//! Common test fixtures for the integration tests
//!
//! A managed `Database` resource publishing connection details to a secret in
//! `infra`, and a `DatabaseClaim` that wants those details copied into its
//! own namespace.

#![allow(dead_code)]

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::ByteString;
use kube::CustomResource;
use managed_runtime::crd::{LocalSecretReference, ResourceSpec, SecretReference};
use managed_runtime::resource::{LocalConnectionSecretOwner, Managed};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FINALIZER: &str = "finalizer.database.example.org";

#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "database.example.org",
    version = "v1alpha1",
    kind = "Database",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSpec {
    #[serde(flatten)]
    pub resource: ResourceSpec,
    pub engine: String,
}

impl Managed for Database {
    fn write_connection_secret_to_reference(&self) -> Option<&SecretReference> {
        self.spec.resource.write_connection_secret_to_ref.as_ref()
    }
}

#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "database.example.org",
    version = "v1alpha1",
    kind = "DatabaseClaim",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseClaimSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<LocalSecretReference>,
}

impl LocalConnectionSecretOwner for DatabaseClaim {
    fn write_local_connection_secret_to_reference(&self) -> Option<&LocalSecretReference> {
        self.spec.write_connection_secret_to_ref.as_ref()
    }
}

/// Managed resource `infra/<name>` with connection secret `infra/<secret>`
pub fn database(name: &str, secret: Option<&str>) -> Database {
    let mut db = Database::new(
        name,
        DatabaseSpec {
            resource: ResourceSpec {
                write_connection_secret_to_ref: secret.map(|s| SecretReference::new("infra", s)),
                ..ResourceSpec::default()
            },
            engine: "postgres".to_string(),
        },
    );
    db.metadata.namespace = Some("infra".to_string());
    db
}

/// Claim `team-a/<name>` wanting its copy in `team-a/<secret>`
pub fn claim(name: &str, secret: Option<&str>) -> DatabaseClaim {
    let mut claim = DatabaseClaim::new(
        name,
        DatabaseClaimSpec {
            write_connection_secret_to_ref: secret.map(LocalSecretReference::new),
        },
    );
    claim.metadata.namespace = Some("team-a".to_string());
    claim
}

/// Secret with an optional controller reference and the given payload
pub fn secret(
    namespace: &str,
    name: &str,
    controller_uid: Option<&str>,
    type_: Option<&str>,
    data: &[(&str, &str)],
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: controller_uid.map(|uid| {
                vec![OwnerReference {
                    api_version: "database.example.org/v1alpha1".to_string(),
                    kind: "Database".to_string(),
                    name: "owner".to_string(),
                    uid: uid.to_string(),
                    controller: Some(true),
                    block_owner_deletion: Some(true),
                }]
            }),
            ..ObjectMeta::default()
        },
        type_: type_.map(str::to_string),
        data: Some(payload(data)),
        ..Secret::default()
    }
}

pub fn payload(data: &[(&str, &str)]) -> BTreeMap<String, ByteString> {
    data.iter()
        .map(|(k, v)| ((*k).to_string(), ByteString(v.as_bytes().to_vec())))
        .collect()
}

pub fn uid_of<K: kube::Resource>(obj: &K) -> String {
    obj.meta().uid.clone().unwrap_or_default()
}
