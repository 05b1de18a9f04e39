//! Tracking record: a ConfigMap `<name>-<engine>-values` holding the values
//! payload last handed to the chart install under the key `data`.

use std::collections::BTreeMap;

use ddc_models::{LABEL_DATASET_ID, VALUES_DATA_KEY, dataset_id, dataset_owner_reference};
use ddc_store::ObjectStore;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::ObjectMeta;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::context::EngineContext;
use crate::error::EngineError;

/// Values payload of one engine that can be read back from its tracking
/// record.
pub trait TrackedValues: DeserializeOwned {
    /// Engine implementation name used in the record name.
    const ENGINE_IMPL: &'static str;

    /// Cache-related settings (mount path, edition).
    fn cache_info(&self) -> BTreeMap<String, String>;

    /// File-system settings (secret references, format command, name).
    fn fs_info(&self) -> BTreeMap<String, String>;
}

pub fn values_record_name(name: &str, engine_impl: &str) -> String {
    format!("{}-{}-values", name, engine_impl)
}

pub fn encode_values<V: Serialize>(values: &V) -> Result<String, EngineError> {
    serde_yaml::to_string(values).map_err(|source| EngineError::Serialization {
        stage: "marshal values".into(),
        source,
    })
}

/// Tracking record for `dataset_name`, labelled with the dataset id and owned
/// by the dataset when its UID is known.
pub fn build_values_record(
    record_name: &str,
    namespace: &str,
    data: String,
    dataset_name: &str,
    owner_uid: Option<&str>,
) -> ConfigMap {
    let owner_uid = owner_uid.filter(|uid| !uid.is_empty());
    let labels = BTreeMap::from([(
        LABEL_DATASET_ID.to_string(),
        dataset_id(namespace, dataset_name, owner_uid),
    )]);
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(record_name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            owner_references: owner_uid
                .map(|uid| vec![dataset_owner_reference(dataset_name, uid)]),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(VALUES_DATA_KEY.to_string(), data)])),
        ..Default::default()
    }
}

/// Payload stored in `record`, or `None` when the record has no `data` key.
pub fn decode_values<V: TrackedValues>(record: &ConfigMap) -> Result<Option<V>, EngineError> {
    let Some(raw) = record.data.as_ref().and_then(|d| d.get(VALUES_DATA_KEY)) else {
        return Ok(None);
    };
    serde_yaml::from_str(raw)
        .map(Some)
        .map_err(|source| EngineError::Serialization {
            stage: format!(
                "unmarshal {}",
                record.metadata.name.as_deref().unwrap_or(VALUES_DATA_KEY)
            ),
            source,
        })
}

pub fn parse_cache_info<V: TrackedValues>(
    record: &ConfigMap,
) -> Result<BTreeMap<String, String>, EngineError> {
    Ok(decode_values::<V>(record)?
        .map(|v| v.cache_info())
        .unwrap_or_default())
}

pub fn parse_fs_info<V: TrackedValues>(
    record: &ConfigMap,
) -> Result<BTreeMap<String, String>, EngineError> {
    Ok(decode_values::<V>(record)?
        .map(|v| v.fs_info())
        .unwrap_or_default())
}

async fn fetch_record<V: TrackedValues, S: ObjectStore>(
    ctx: &EngineContext<S>,
) -> Result<ConfigMap, EngineError> {
    ctx.ensure_active()?;
    let record_name = values_record_name(&ctx.name, V::ENGINE_IMPL);
    debug!(record = %record_name, "reading tracking record");
    Ok(ctx.store.get::<ConfigMap>(&ctx.namespace, &record_name).await?)
}

/// Cache settings of the runtime named by `ctx`, read from its tracking record.
#[instrument(skip_all, fields(ns = %ctx.namespace, name = %ctx.name))]
pub async fn get_cache_info<V: TrackedValues, S: ObjectStore>(
    ctx: &EngineContext<S>,
) -> Result<BTreeMap<String, String>, EngineError> {
    let record = fetch_record::<V, S>(ctx).await?;
    parse_cache_info::<V>(&record)
}

#[instrument(skip_all, fields(ns = %ctx.namespace, name = %ctx.name))]
pub async fn get_fs_info<V: TrackedValues, S: ObjectStore>(
    ctx: &EngineContext<S>,
) -> Result<BTreeMap<String, String>, EngineError> {
    let record = fetch_record::<V, S>(ctx).await?;
    parse_fs_info::<V>(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{JuiceFsConfigs, JuiceFsFuse, JuiceFsValues};
    use ddc_store::memory::MemoryStore;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn values() -> JuiceFsValues {
        JuiceFsValues {
            fullname_override: "jfsdemo".into(),
            edition: "community".into(),
            source: "redis://10.0.0.1:6379/1".into(),
            configs: JuiceFsConfigs {
                name: "jfsdemo".into(),
                metaurl_secret: "jfs-secret".into(),
                metaurl_secret_key: "metaurl".into(),
                access_key_secret: "jfs-secret".into(),
                access_key_secret_key: "access-key".into(),
                secret_key_secret: "jfs-secret".into(),
                secret_key_secret_key: "secret-key".into(),
                format_cmd: "/usr/local/bin/juicefs format --trash-days=0".into(),
                ..Default::default()
            },
            fuse: JuiceFsFuse {
                mount_path: "/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse".into(),
                ..Default::default()
            },
        }
    }

    fn record(data: Option<&str>) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some("jfsdemo-juicefs-values".into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            data: data.map(|d| BTreeMap::from([("data".to_string(), d.to_string())])),
            ..Default::default()
        }
    }

    #[test]
    fn record_carries_label_and_owner() {
        let cm = build_values_record("hbase-jindo-values", "fluid", "a: 1\n".into(), "hbase", Some("u-1"));
        assert_eq!(cm.metadata.name.as_deref(), Some("hbase-jindo-values"));
        assert_eq!(
            cm.metadata.labels.unwrap()["fluid.io/dataset-id"],
            "u-1".to_string()
        );
        let owners = cm.metadata.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "Dataset");
        assert_eq!(owners[0].uid, "u-1");
        assert_eq!(cm.data.unwrap()["data"], "a: 1\n");
    }

    #[test]
    fn record_without_uid_has_no_owner() {
        let cm = build_values_record("hbase-jindo-values", "fluid", String::new(), "hbase", None);
        assert!(cm.metadata.owner_references.is_none());
        assert_eq!(cm.metadata.labels.unwrap()["fluid.io/dataset-id"], "fluid-hbase");
    }

    #[test]
    fn cache_info_projects_mount_path_and_edition() {
        let data = encode_values(&values()).unwrap();
        let info = parse_cache_info::<JuiceFsValues>(&record(Some(&data))).unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(
            info["mountpath"],
            "/runtime-mnt/juicefs/default/jfsdemo/juicefs-fuse"
        );
        assert_eq!(info["edition"], "community");
    }

    #[test]
    fn fs_info_projects_config_fields() {
        let data = encode_values(&values()).unwrap();
        let info = parse_fs_info::<JuiceFsValues>(&record(Some(&data))).unwrap();
        assert_eq!(info.len(), 11);
        assert_eq!(info["metaurlsecret"], "jfs-secret");
        assert_eq!(info["metaurlsecretkey"], "metaurl");
        assert_eq!(info["tokensecret"], "");
        assert_eq!(info["accesskeysecretkey"], "access-key");
        assert_eq!(info["secretkeysecretkey"], "secret-key");
        assert_eq!(info["formatcmd"], "/usr/local/bin/juicefs format --trash-days=0");
        assert_eq!(info["name"], "jfsdemo");
        assert_eq!(info["edition"], "community");
    }

    #[test]
    fn missing_data_key_yields_empty_map() {
        assert!(parse_cache_info::<JuiceFsValues>(&record(None)).unwrap().is_empty());
        assert!(parse_fs_info::<JuiceFsValues>(&record(None)).unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = parse_fs_info::<JuiceFsValues>(&record(Some("configs: [1, 2"))).unwrap_err();
        assert!(matches!(err, EngineError::Serialization { .. }), "{err}");
    }

    #[tokio::test]
    async fn lookup_reads_record_by_derived_name() {
        let store = Arc::new(MemoryStore::new());
        let data = encode_values(&values()).unwrap();
        store.create(&record(Some(&data))).await.unwrap();

        let ctx = EngineContext::new(store.clone(), "jfsdemo", "default", "juicefs");
        let info = get_cache_info::<JuiceFsValues, _>(&ctx).await.unwrap();
        assert_eq!(info["edition"], "community");

        let other = EngineContext::new(store, "other", "default", "juicefs");
        let err = get_fs_info::<JuiceFsValues, _>(&other).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn cancelled_lookup_skips_the_store() {
        let store = Arc::new(MemoryStore::new());
        let data = encode_values(&values()).unwrap();
        store.create(&record(Some(&data))).await.unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let ctx = EngineContext::new(store, "jfsdemo", "default", "juicefs").with_cancellation(token);

        let err = get_cache_info::<JuiceFsValues, _>(&ctx).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled), "{err}");
        let err = get_fs_info::<JuiceFsValues, _>(&ctx).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled), "{err}");
    }
}
