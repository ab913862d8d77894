//! # Kubernetes Object Store
//!
//! [`ObjectStore`] over `kube::Api`. Each call is bounded by the configured
//! request timeout; an elapsed timeout is reported as a transport error.

use super::{key_of, ObjectStore};
use crate::config::ControllerConfig;
use crate::error::StoreError;
use crate::resource::{ObjectKey, StoredObject};
use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Object store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    field_manager: String,
    request_timeout: Duration,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore")
            .field("field_manager", &self.field_manager)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client, config: &ControllerConfig) -> Self {
        Self {
            client,
            field_manager: config.field_manager.clone(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Build a store from the in-cluster or kubeconfig client
    ///
    /// Installs the ring rustls crypto provider first; an already installed
    /// provider is kept.
    ///
    /// # Errors
    ///
    /// Fails when no Kubernetes configuration can be inferred.
    pub async fn try_default(config: &ControllerConfig) -> Result<Self> {
        // Another component may have installed a provider already; keep it
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;
        Ok(Self::new(client, config))
    }

    fn api<K: StoredObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..PostParams::default()
        }
    }

    fn patch_params(&self) -> PatchParams {
        PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..PatchParams::default()
        }
    }

    /// Run one API call under the request timeout and map its error
    async fn call<K, F>(&self, verb: &'static str, key: &ObjectKey, request: F) -> Result<K, StoreError>
    where
        K: StoredObject,
        F: Future<Output = Result<K, kube::Error>> + Send,
    {
        let kind = K::kind(&());
        debug!(
            verb = verb,
            kind = %kind,
            namespace = %key.namespace,
            name = %key.name,
            "store.request"
        );

        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result.map_err(|e| StoreError::from_kube(&kind, key, e)),
            Err(_elapsed) => {
                warn!(
                    verb = verb,
                    kind = %kind,
                    namespace = %key.namespace,
                    name = %key.name,
                    timeout_secs = self.request_timeout.as_secs(),
                    "store.request.timeout"
                );
                Err(StoreError::Transport(format!(
                    "{verb} {kind} {key} timed out after {}s",
                    self.request_timeout.as_secs()
                )))
            }
        }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoredObject>(&self, key: &ObjectKey) -> Result<K, StoreError> {
        let api = self.api::<K>(&key.namespace);
        self.call("get", key, api.get(&key.name)).await
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj)?;
        let api = self.api::<K>(&key.namespace);
        let params = self.post_params();
        self.call("create", &key, api.create(&params, obj)).await
    }

    async fn update<K: StoredObject>(&self, obj: &K) -> Result<K, StoreError> {
        let key = key_of(obj)?;
        let api = self.api::<K>(&key.namespace);
        let params = self.post_params();
        self.call("update", &key, api.replace(&key.name, &params, obj))
            .await
    }

    async fn patch<K: StoredObject>(
        &self,
        key: &ObjectKey,
        merge_patch: &[u8],
    ) -> Result<K, StoreError> {
        let body: serde_json::Value = serde_json::from_slice(merge_patch)?;
        let api = self.api::<K>(&key.namespace);
        let params = self.patch_params();
        self.call("patch", key, api.patch(&key.name, &params, &Patch::Merge(&body)))
            .await
    }
}
