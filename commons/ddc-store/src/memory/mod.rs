use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StoreError;
use crate::traits::*;

/// In-process object store with API-server-like semantics: objects are kept
/// serialized, every write bumps a global revision used as
/// `resourceVersion`, and status replacement is version checked.
///
/// `create` keeps whatever status the object carries so tests can seed
/// pre-populated objects.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<ObjectKey, Value>>>,
    revision: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

fn decode<K: StoredObject>(value: &Value) -> StoreResult<K> {
    Ok(serde_json::from_value(value.clone())?)
}

fn stored_revision(value: &Value) -> Option<&str> {
    value
        .get("metadata")
        .and_then(|m| m.get("resourceVersion"))
        .and_then(|v| v.as_str())
}

fn set_revision(value: &mut Value, revision: &str) {
    if let Some(meta) = value.get_mut("metadata").and_then(|m| m.as_object_mut()) {
        meta.insert("resourceVersion".into(), Value::String(revision.into()));
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<K> {
        let key = ObjectKey::of::<K>(namespace, name);
        let store = self.objects.read().await;
        match store.get(&key) {
            Some(v) => decode(v),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    async fn list<K: StoredObject>(&self, namespace: &str) -> StoreResult<Vec<K>> {
        let kind = K::kind(&());
        let store = self.objects.read().await;
        store
            .iter()
            .filter(|(k, _)| k.kind == kind && k.namespace == namespace)
            .map(|(_, v)| decode(v))
            .collect()
    }

    async fn create<K: StoredObject>(&self, obj: &K) -> StoreResult<K> {
        let key = ObjectKey::for_object(obj)?;
        let mut store = self.objects.write().await;
        if store.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        let revision = self.next_revision();
        let mut created = obj.clone();
        let meta = created.meta_mut();
        meta.resource_version = Some(revision.clone());
        if meta.uid.is_none() {
            meta.uid = Some(format!("uid-{}", revision));
        }
        store.insert(key.clone(), serde_json::to_value(&created)?);
        trace!(%key, %revision, "memory store: created");
        Ok(created)
    }

    async fn replace_status<K: StoredObject>(&self, obj: &K) -> StoreResult<K> {
        let key = ObjectKey::for_object(obj)?;
        let incoming = serde_json::to_value(obj)?;
        let mut store = self.objects.write().await;
        let current = store
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if let Some(expected) = obj.meta().resource_version.as_deref() {
            let actual = stored_revision(current).unwrap_or_default();
            if expected != actual {
                return Err(StoreError::Conflict(format!(
                    "{}: resourceVersion {} does not match {}",
                    key, expected, actual
                )));
            }
        }

        let revision = self.next_revision();
        if let Some(fields) = current.as_object_mut() {
            match incoming.get("status") {
                Some(status) if !status.is_null() => {
                    fields.insert("status".into(), status.clone());
                }
                _ => {
                    fields.remove("status");
                }
            }
        }
        set_revision(current, &revision);
        trace!(%key, %revision, "memory store: status replaced");
        decode(current)
    }

    async fn delete<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()> {
        let key = ObjectKey::of::<K>(namespace, name);
        let mut store = self.objects.write().await;
        match store.remove(&key) {
            Some(_) => {
                trace!(%key, "memory store: deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}
