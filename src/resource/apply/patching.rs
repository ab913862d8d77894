//! # Patching Applicator

use super::{
    run_options, Applicator, ApplyOption, ERR_CREATE_OBJECT, ERR_GET_OBJECT, ERR_PATCH_OBJECT,
};
use crate::error::{ResultExt, StoreError};
use crate::resource::{ObjectKey, ObjectStore, StoredObject};
use async_trait::async_trait;

/// Applies changes by creating the object or merge-patching it
///
/// The patch body is the desired object exactly as passed in, serialized
/// before the store is read. Fields absent from it stay as stored even if
/// they changed concurrently. The resource version and UID are stripped
/// from the body so the store never treats them as preconditions; concurrent
/// writes to declared fields are overwritten.
#[derive(Debug, Clone)]
pub struct PatchingApplicator<S> {
    store: S,
}

impl<S: ObjectStore> PatchingApplicator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> Applicator for PatchingApplicator<S> {
    async fn apply<K: StoredObject>(
        &self,
        obj: &mut K,
        options: &[ApplyOption<K>],
    ) -> crate::error::Result<()> {
        let key = ObjectKey::of(obj)?;
        let mut desired = obj.clone();
        desired.meta_mut().resource_version = None;
        desired.meta_mut().uid = None;

        match self.store.get::<K>(&key).await {
            Ok(current) => *obj = current,
            Err(e) if e.is_not_found() => {
                *obj = self.store.create(obj).await.context(ERR_CREATE_OBJECT)?;
                return Ok(());
            }
            Err(e) => return Err(e).context(ERR_GET_OBJECT),
        }

        run_options(options, obj, &mut desired)?;

        let body = serde_json::to_vec(&desired)
            .map_err(StoreError::from)
            .context(ERR_PATCH_OBJECT)?;
        *obj = self
            .store
            .patch::<K>(&key, &body)
            .await
            .context(ERR_PATCH_OBJECT)?;
        Ok(())
    }
}
