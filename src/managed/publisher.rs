//! # Connection Publishing
//!
//! Writes a managed resource's connection details to the secret it
//! references. The secret is controlled by the managed resource, so deleting
//! the resource garbage-collects the secret and unpublishing has nothing to do.

use super::ConnectionDetails;
use crate::error::{Result, ResultExt};
use crate::resource::{
    connection_secret_for, connection_secret_must_be_controllable_by, Applicator, Managed,
    ObjectStore, PatchingApplicator, StaticTypeResolver, TypeResolver,
};
use async_trait::async_trait;
use k8s_openapi::ByteString;

const ERR_CREATE_OR_UPDATE_SECRET: &str = "cannot create or update connection secret";

/// Publishes and unpublishes a managed resource's connection details
#[async_trait]
pub trait ConnectionPublisher: Send + Sync {
    /// Write `details` where `mg` asks for them
    ///
    /// A no-op when the resource references no connection secret.
    async fn publish_connection<M: Managed>(
        &self,
        mg: &M,
        details: &ConnectionDetails,
    ) -> Result<()>;

    /// Withdraw previously published details
    async fn unpublish_connection<M: Managed>(
        &self,
        mg: &M,
        details: &ConnectionDetails,
    ) -> Result<()>;
}

/// Publishes connection details to a secret through the store
///
/// Secrets are merge-patched, so keys written by others are kept. An
/// existing secret controlled by anything other than the managed resource
/// is never written.
#[derive(Debug, Clone)]
pub struct ApiSecretPublisher<S, T = StaticTypeResolver> {
    applicator: PatchingApplicator<S>,
    typer: T,
}

impl<S: ObjectStore> ApiSecretPublisher<S> {
    pub fn new(store: S) -> Self {
        Self::with_type_resolver(store, StaticTypeResolver)
    }
}

impl<S: ObjectStore, T: TypeResolver> ApiSecretPublisher<S, T> {
    pub fn with_type_resolver(store: S, typer: T) -> Self {
        Self {
            applicator: PatchingApplicator::new(store),
            typer,
        }
    }
}

#[async_trait]
impl<S: ObjectStore, T: TypeResolver> ConnectionPublisher for ApiSecretPublisher<S, T> {
    async fn publish_connection<M: Managed>(
        &self,
        mg: &M,
        details: &ConnectionDetails,
    ) -> Result<()> {
        if mg.write_connection_secret_to_reference().is_none() {
            return Ok(());
        }

        let gvk = self.typer.resolve_kind(mg)?;
        let mut secret = connection_secret_for(mg, &gvk)?;
        secret.data = Some(
            details
                .iter()
                .map(|(key, value)| (key.clone(), ByteString(value.clone())))
                .collect(),
        );

        let uid = mg.meta().uid.clone().unwrap_or_default();
        self.applicator
            .apply(&mut secret, &[connection_secret_must_be_controllable_by(uid)])
            .await
            .context(ERR_CREATE_OR_UPDATE_SECRET)
    }

    /// Nothing to do: the secret is garbage-collected with its owner
    async fn unpublish_connection<M: Managed>(
        &self,
        _mg: &M,
        _details: &ConnectionDetails,
    ) -> Result<()> {
        Ok(())
    }
}

/// Publisher that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NopConnectionPublisher;

#[async_trait]
impl ConnectionPublisher for NopConnectionPublisher {
    async fn publish_connection<M: Managed>(
        &self,
        _mg: &M,
        _details: &ConnectionDetails,
    ) -> Result<()> {
        Ok(())
    }

    async fn unpublish_connection<M: Managed>(
        &self,
        _mg: &M,
        _details: &ConnectionDetails,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECRET_TYPE_CONNECTION;
    use crate::managed::tests::database;
    use crate::meta;
    use crate::resource::{MemoryStore, ObjectKey};
    use k8s_openapi::api::core::v1::Secret;

    fn details() -> ConnectionDetails {
        ConnectionDetails::from([
            ("user".to_string(), b"a".to_vec()),
            ("pass".to_string(), b"b".to_vec()),
        ])
    }

    #[tokio::test]
    async fn test_publish_creates_controlled_secret() {
        let store = MemoryStore::new();
        let db = store.insert(&database("db-1")).unwrap();
        let publisher = ApiSecretPublisher::new(store.clone());

        publisher.publish_connection(&db, &details()).await.unwrap();

        let secret: Secret = store.stored(&ObjectKey::new("infra", "creds")).unwrap();
        let data = secret.data.clone().unwrap();
        assert_eq!(data["user"].0, b"a");
        assert_eq!(data["pass"].0, b"b");
        assert_eq!(secret.type_.as_deref(), Some(SECRET_TYPE_CONNECTION));
        assert!(meta::is_controlled_by(
            &secret,
            db.metadata.uid.as_deref().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_resource_without_secret_reference_is_skipped() {
        let store = MemoryStore::new();
        let mut db = database("db-1");
        db.spec.resource.write_connection_secret_to_ref = None;
        let db = store.insert(&db).unwrap();

        ApiSecretPublisher::new(store.clone())
            .publish_connection(&db, &details())
            .await
            .unwrap();
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unpublish_writes_nothing() {
        let store = MemoryStore::new();
        let db = store.insert(&database("db-1")).unwrap();
        ApiSecretPublisher::new(store.clone())
            .unpublish_connection(&db, &details())
            .await
            .unwrap();
        assert!(store.calls().is_empty());
    }
}
