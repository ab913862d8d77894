//! # Managed Resource Lifecycle
//!
//! Small collaborators a managed resource reconciler calls at fixed points of
//! its loop: keep a finalizer on the resource while the external resource
//! exists, default the external name, and publish connection details.
//!
//! Each collaborator has a store-backed implementation and a no-op one for
//! reconcilers that do not need the step.
//!
//! ## Module Structure
//!
//! - `finalizer.rs` - `Finalizer` trait, `ApiFinalizer`, `NopFinalizer`
//! - `initializer.rs` - `Initializer` trait, `NameAsExternalName`, `NopInitializer`
//! - `publisher.rs` - `ConnectionPublisher` trait, `ApiSecretPublisher`, `NopConnectionPublisher`

mod finalizer;
mod initializer;
mod publisher;

pub use finalizer::{ApiFinalizer, Finalizer, NopFinalizer};
pub use initializer::{Initializer, NameAsExternalName, NopInitializer};
pub use publisher::{ApiSecretPublisher, ConnectionPublisher, NopConnectionPublisher};

use std::collections::BTreeMap;

/// Connection details of an external resource, keyed by field name
///
/// Typically endpoint, port, username and password. Values are raw bytes and
/// become secret data unchanged.
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

const ERR_UPDATE_MANAGED: &str = "cannot update managed resource";

#[cfg(test)]
mod tests {
    use crate::crd::{ResourceSpec, SecretReference};
    use crate::resource::Managed;
    use kube::CustomResource;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    pub const FINALIZER: &str = "finalizer.database.example.org";

    #[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
    #[kube(
        group = "database.example.org",
        version = "v1alpha1",
        kind = "TestDatabase",
        namespaced
    )]
    #[serde(rename_all = "camelCase")]
    pub struct TestDatabaseSpec {
        #[serde(flatten)]
        pub resource: ResourceSpec,
        pub engine: String,
    }

    impl Managed for TestDatabase {
        fn write_connection_secret_to_reference(&self) -> Option<&SecretReference> {
            self.spec.resource.write_connection_secret_to_ref.as_ref()
        }
    }

    /// Managed resource in `infra` publishing to `infra/creds`
    pub fn database(name: &str) -> TestDatabase {
        let mut db = TestDatabase::new(
            name,
            TestDatabaseSpec {
                resource: ResourceSpec {
                    write_connection_secret_to_ref: Some(SecretReference::new("infra", "creds")),
                    ..ResourceSpec::default()
                },
                engine: "postgres".to_string(),
            },
        );
        db.metadata.namespace = Some("infra".to_string());
        db
    }
}
