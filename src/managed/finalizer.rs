//! # Finalizers

use super::ERR_UPDATE_MANAGED;
use crate::config::ControllerConfig;
use crate::error::{ignore_not_found, Result, ResultExt};
use crate::meta;
use crate::resource::{Managed, ObjectStore};
use async_trait::async_trait;

/// Adds and removes a finalizer on a managed resource
#[async_trait]
pub trait Finalizer: Send + Sync {
    /// Ensure the finalizer is present, writing only when it was missing
    async fn add_finalizer<M: Managed>(&self, mg: &mut M) -> Result<()>;

    /// Ensure the finalizer is absent
    ///
    /// Succeeds when the resource is already gone from the store.
    async fn remove_finalizer<M: Managed>(&self, mg: &mut M) -> Result<()>;
}

/// Finalizer backed by full updates against the store
///
/// Updates carry the resource version of `mg`, so a stale copy fails with a
/// conflict instead of overwriting concurrent changes.
#[derive(Debug, Clone)]
pub struct ApiFinalizer<S> {
    store: S,
    finalizer: String,
}

impl<S: ObjectStore> ApiFinalizer<S> {
    pub fn new(store: S, finalizer: impl Into<String>) -> Self {
        Self {
            store,
            finalizer: finalizer.into(),
        }
    }

    /// Finalizer using the configured token
    pub fn from_config(store: S, config: &ControllerConfig) -> Self {
        Self::new(store, config.finalizer.clone())
    }

    #[must_use]
    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }
}

#[async_trait]
impl<S: ObjectStore> Finalizer for ApiFinalizer<S> {
    async fn add_finalizer<M: Managed>(&self, mg: &mut M) -> Result<()> {
        if meta::finalizer_exists(mg, &self.finalizer) {
            return Ok(());
        }
        meta::add_finalizer(mg, &self.finalizer);
        *mg = self.store.update(&*mg).await.context(ERR_UPDATE_MANAGED)?;
        Ok(())
    }

    async fn remove_finalizer<M: Managed>(&self, mg: &mut M) -> Result<()> {
        meta::remove_finalizer(mg, &self.finalizer);
        let updated = self
            .store
            .update(&*mg)
            .await
            .context(ERR_UPDATE_MANAGED)
            .map(|stored| *mg = stored);
        ignore_not_found(updated)
    }
}

/// Finalizer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NopFinalizer;

#[async_trait]
impl Finalizer for NopFinalizer {
    async fn add_finalizer<M: Managed>(&self, _mg: &mut M) -> Result<()> {
        Ok(())
    }

    async fn remove_finalizer<M: Managed>(&self, _mg: &mut M) -> Result<()> {
        Ok(())
    }
}
