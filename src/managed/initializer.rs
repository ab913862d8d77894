//! # Initializers

use super::ERR_UPDATE_MANAGED;
use crate::error::{Result, ResultExt};
use crate::meta;
use crate::resource::{Managed, ObjectStore};
use async_trait::async_trait;

/// Prepares a managed resource before its external resource is observed
#[async_trait]
pub trait Initializer: Send + Sync {
    async fn initialize<M: Managed>(&self, mg: &mut M) -> Result<()>;
}

/// Defaults the external name annotation to the resource's own name
///
/// A resource that already carries a non-empty external name is left alone
/// and nothing is written.
#[derive(Debug, Clone)]
pub struct NameAsExternalName<S> {
    store: S,
}

impl<S: ObjectStore> NameAsExternalName<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> Initializer for NameAsExternalName<S> {
    async fn initialize<M: Managed>(&self, mg: &mut M) -> Result<()> {
        if meta::external_name(mg).is_some() {
            return Ok(());
        }
        let name = mg.meta().name.clone().unwrap_or_default();
        meta::set_external_name(mg, &name);
        *mg = self.store.update(&*mg).await.context(ERR_UPDATE_MANAGED)?;
        Ok(())
    }
}

/// Initializer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NopInitializer;

#[async_trait]
impl Initializer for NopInitializer {
    async fn initialize<M: Managed>(&self, _mg: &mut M) -> Result<()> {
        Ok(())
    }
}
