//! # Updating Applicator

use super::{
    run_options, Applicator, ApplyOption, ERR_CREATE_OBJECT, ERR_GET_OBJECT, ERR_UPDATE_OBJECT,
};
use crate::error::ResultExt;
use crate::resource::{ObjectKey, ObjectStore, StoredObject};
use async_trait::async_trait;

/// Applies changes by creating the object or replacing it
///
/// The replacement carries the resource version observed by this call's
/// read, so a write that landed in between makes the store reject the
/// update with a conflict. The conflict is returned as is.
#[derive(Debug, Clone)]
pub struct UpdatingApplicator<S> {
    store: S,
}

impl<S: ObjectStore> UpdatingApplicator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ObjectStore> Applicator for UpdatingApplicator<S> {
    async fn apply<K: StoredObject>(
        &self,
        obj: &mut K,
        options: &[ApplyOption<K>],
    ) -> crate::error::Result<()> {
        let key = ObjectKey::of(obj)?;

        let current = match self.store.get::<K>(&key).await {
            Ok(current) => current,
            Err(e) if e.is_not_found() => {
                *obj = self.store.create(obj).await.context(ERR_CREATE_OBJECT)?;
                return Ok(());
            }
            Err(e) => return Err(e).context(ERR_GET_OBJECT),
        };

        run_options(options, &current, obj)?;

        obj.meta_mut()
            .resource_version
            .clone_from(&current.meta().resource_version);
        *obj = self.store.update(obj).await.context(ERR_UPDATE_OBJECT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{MemoryStore, Verb};
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn config_map(data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some("settings".to_string()),
                namespace: Some("default".to_string()),
                ..ObjectMeta::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..ConfigMap::default()
        }
    }

    #[tokio::test]
    async fn test_existing_object_is_replaced_with_read_version() {
        let store = MemoryStore::new();
        let stored = store.insert(&config_map(&[("a", "1"), ("b", "2")])).unwrap();
        let applicator = UpdatingApplicator::new(store.clone());

        // No resource version on the desired object; the applicator supplies it
        let mut desired = config_map(&[("a", "10")]);
        applicator.apply(&mut desired, &[]).await.unwrap();

        let data = desired.data.clone().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["a"], "10");
        assert_eq!(desired.metadata.uid, stored.metadata.uid);
        assert_ne!(
            desired.metadata.resource_version,
            stored.metadata.resource_version
        );
        let verbs: Vec<Verb> = store.calls().iter().map(|c| c.verb).collect();
        assert_eq!(verbs, vec![Verb::Get, Verb::Update]);
    }
}
