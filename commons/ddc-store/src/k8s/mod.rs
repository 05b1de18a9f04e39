use async_trait::async_trait;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::*;

/// Object store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: StoredObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Map API status codes onto store errors: 404 is NotFound, 409 is either
/// AlreadyExists (create) or a resourceVersion Conflict.
pub fn map_kube_error(err: kube::Error, key: &ObjectKey) -> StoreError {
    match &err {
        kube::Error::Api(ae) if ae.code == 404 => {
            StoreError::NotFound(key.to_string())
        }
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            StoreError::AlreadyExists(key.to_string())
        }
        kube::Error::Api(ae) if ae.code == 409 => {
            StoreError::Conflict(format!("{}: {}", key, ae.message))
        }
        _ => StoreError::Backend(format!("{}: {}", key, err)),
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<K> {
        let key = ObjectKey::of::<K>(namespace, name);
        self.api::<K>(namespace)
            .get(name)
            .await
            .map_err(|e| map_kube_error(e, &key))
    }

    async fn list<K: StoredObject>(&self, namespace: &str) -> StoreResult<Vec<K>> {
        let key = ObjectKey::of::<K>(namespace, "*");
        let list = self
            .api::<K>(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| map_kube_error(e, &key))?;
        Ok(list.items)
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> StoreResult<K> {
        let key = ObjectKey::for_object(obj)?;
        debug!(%key, "kube store: create");
        self.api::<K>(&key.namespace)
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| map_kube_error(e, &key))
    }

    async fn replace_status<K: StoredObject>(&self, obj: &K) -> StoreResult<K> {
        let key = ObjectKey::for_object(obj)?;
        debug!(%key, rv = ?obj.resource_version(), "kube store: replace status");
        let data = serde_json::to_vec(obj)?;
        self.api::<K>(&key.namespace)
            .replace_subresource("status", &key.name, &PostParams::default(), data)
            .await
            .map_err(|e| map_kube_error(e, &key))
    }

    async fn delete<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()> {
        let key = ObjectKey::of::<K>(namespace, name);
        debug!(%key, "kube store: delete");
        self.api::<K>(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| map_kube_error(e, &key))
    }
}
