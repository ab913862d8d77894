//! # Type Resolution
//!
//! Resolves the group, version and kind of an object, used to build owner
//! references pointing at it.

use crate::error::{Error, Result};
use crate::resource::StoredObject;
use kube::api::GroupVersionKind;

/// Resolves an object's `GroupVersionKind`
pub trait TypeResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns `InvalidObject` when the object's kind cannot be determined.
    fn resolve_kind<K: StoredObject>(&self, obj: &K) -> Result<GroupVersionKind>;
}

/// Resolves kinds from the static type information of `kube::Resource`
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTypeResolver;

impl TypeResolver for StaticTypeResolver {
    fn resolve_kind<K: StoredObject>(&self, _obj: &K) -> Result<GroupVersionKind> {
        let kind = K::kind(&());
        let version = K::version(&());
        if kind.is_empty() || version.is_empty() {
            return Err(Error::InvalidObject(format!(
                "cannot resolve kind of {}",
                std::any::type_name::<K>()
            )));
        }
        Ok(GroupVersionKind::gvk(&K::group(&()), &version, &kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::Secret;

    #[test]
    fn test_core_kind_has_empty_group() {
        let gvk = StaticTypeResolver.resolve_kind(&Secret::default()).unwrap();
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.kind, "Secret");
        assert_eq!(gvk.api_version(), "v1");
    }

    #[test]
    fn test_grouped_kind() {
        let gvk = StaticTypeResolver
            .resolve_kind(&Deployment::default())
            .unwrap();
        assert_eq!(gvk.api_version(), "apps/v1");
        assert_eq!(gvk.kind, "Deployment");
    }
}
