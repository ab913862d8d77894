//! # Connection Propagation
//!
//! Copies connection details from a managed resource's secret into a secret
//! owned by another object, typically a claim in an application namespace.
//!
//! The copy only happens when the managed resource is the controller of the
//! secret it references. Without that check any object able to create a
//! managed resource could name someone else's secret and have it copied
//! somewhere it can read.
//!
//! The sequence (read source, write destination, mark source) is not
//! atomic. The destination is written before the source is marked; a
//! failure in between leaves a copy without a marker, and re-running the
//! propagation completes it.

use crate::error::{Error, Result, ResultExt};
use crate::meta;
use crate::resource::secret::local_connection_secret_for;
use crate::resource::{
    connection_secret_must_be_controllable_by, Applicator, LocalConnectionSecretOwner, Managed,
    ObjectStore, StaticTypeResolver, TypeResolver, UpdatingApplicator,
};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;

const ERR_GET_SECRET: &str = "cannot get managed resource's connection secret";
const ERR_SECRET_CONFLICT: &str = "cannot establish control of existing connection secret";
const ERR_UPDATE_SECRET: &str = "cannot update connection secret";
const ERR_CREATE_OR_UPDATE_SECRET: &str = "cannot create or update connection secret";

/// Propagates connection details from a managed resource to another owner
#[async_trait]
pub trait ConnectionPropagator: Send + Sync {
    /// Copy the connection secret of `mg` into the secret requested by `owner`
    ///
    /// A no-op when either side has no secret reference.
    async fn propagate_connection<O, M>(&self, owner: &O, mg: &M) -> Result<()>
    where
        O: LocalConnectionSecretOwner,
        M: Managed;
}

/// Propagates connection details by reading and writing secrets in the store
#[derive(Debug, Clone)]
pub struct ApiManagedConnectionPropagator<S, T = StaticTypeResolver> {
    store: S,
    applicator: UpdatingApplicator<S>,
    typer: T,
}

impl<S: ObjectStore + Clone> ApiManagedConnectionPropagator<S> {
    pub fn new(store: S) -> Self {
        Self::with_type_resolver(store, StaticTypeResolver)
    }
}

impl<S: ObjectStore + Clone, T: TypeResolver> ApiManagedConnectionPropagator<S, T> {
    pub fn with_type_resolver(store: S, typer: T) -> Self {
        Self {
            applicator: UpdatingApplicator::new(store.clone()),
            store,
            typer,
        }
    }
}

#[async_trait]
impl<S, T> ConnectionPropagator for ApiManagedConnectionPropagator<S, T>
where
    S: ObjectStore,
    T: TypeResolver,
{
    async fn propagate_connection<O, M>(&self, owner: &O, mg: &M) -> Result<()>
    where
        O: LocalConnectionSecretOwner,
        M: Managed,
    {
        // Either the managed resource exposes no connection secret, or the
        // owner does not want one.
        let Some(source) = mg.write_connection_secret_to_reference() else {
            return Ok(());
        };
        if owner.write_local_connection_secret_to_reference().is_none() {
            return Ok(());
        }

        let mut from: Secret = self
            .store
            .get(&source.key())
            .await
            .context(ERR_GET_SECRET)?;

        let mg_uid = mg.meta().uid.as_deref().unwrap_or_default();
        if !meta::is_controlled_by(&from, mg_uid) {
            return Err(Error::OwnershipViolation(ERR_SECRET_CONFLICT.to_string()));
        }

        let gvk = self.typer.resolve_kind(owner)?;
        let mut to = local_connection_secret_for(owner, &gvk)?;
        to.data.clone_from(&from.data);

        let owner_uid = owner.meta().uid.clone().unwrap_or_default();
        meta::allow_propagation(&mut from, &mut to, &owner_uid);

        self.applicator
            .apply(
                &mut to,
                &[connection_secret_must_be_controllable_by(owner_uid)],
            )
            .await
            .context(ERR_CREATE_OR_UPDATE_SECRET)?;

        self.store
            .update(&from)
            .await
            .context(ERR_UPDATE_SECRET)?;
        Ok(())
    }
}
