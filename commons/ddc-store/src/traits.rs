use std::fmt::{self, Debug};

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Any namespaced object the store can hold (custom resources, ConfigMaps).
pub trait StoredObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<T> StoredObject for T where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Identity of a stored object: kind + namespace + name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn of<K: StoredObject>(namespace: &str, name: &str) -> Self {
        Self {
            kind: K::kind(&()).into_owned(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Key of an existing object; fails when name or namespace is unset.
    pub fn for_object<K: StoredObject>(obj: &K) -> StoreResult<Self> {
        let meta = obj.meta();
        let kind = K::kind(&());
        let name = meta.name.as_deref().ok_or_else(|| {
            StoreError::InvalidObject(format!("{} without metadata.name", kind))
        })?;
        let namespace = meta.namespace.as_deref().ok_or_else(|| {
            StoreError::InvalidObject(format!(
                "{} {} without metadata.namespace",
                kind, name
            ))
        })?;
        Ok(Self::of::<K>(namespace, name))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Cluster object store.
///
/// `replace_status` is optimistic: when the object carries a
/// `resourceVersion` that no longer matches the stored one the call fails
/// with [`StoreError::Conflict`] and nothing is written.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<K>;

    async fn list<K: StoredObject>(&self, namespace: &str) -> StoreResult<Vec<K>>;

    async fn create<K: StoredObject>(&self, obj: &K) -> StoreResult<K>;

    async fn replace_status<K: StoredObject>(&self, obj: &K) -> StoreResult<K>;

    async fn delete<K: StoredObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()>;
}
