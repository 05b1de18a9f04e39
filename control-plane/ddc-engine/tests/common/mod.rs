#![allow(dead_code)]

use std::collections::BTreeMap;

use ddc_models::{
    CompTemplateSpec, Dataset, DatasetSpec, DatasetStatus, JuiceFSRuntime, JuiceFsRuntimeSpec,
    RuntimePhase, RuntimeStatus,
};
use kube::core::ObjectMeta;
use rand::Rng;

// DNS-1123 safe numeric suffix for unique names
pub fn uniq(prefix: &str) -> String {
    format!("{prefix}-{:06}", rand::rng().random_range(0..1_000_000))
}

pub fn meta(name: &str, ns: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.into()),
        namespace: Some(ns.into()),
        ..Default::default()
    }
}

pub fn dataset(name: &str, ns: &str, status: Option<DatasetStatus>) -> Dataset {
    Dataset {
        metadata: meta(name, ns),
        spec: DatasetSpec::default(),
        status,
    }
}

pub fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// JuiceFS runtime with a usable metaurl secret and the given master phase.
pub fn juicefs_runtime(
    name: &str,
    ns: &str,
    master_phase: RuntimePhase,
    cache_states: &[(&str, &str)],
) -> JuiceFSRuntime {
    JuiceFSRuntime {
        metadata: meta(name, ns),
        spec: JuiceFsRuntimeSpec {
            master: CompTemplateSpec {
                replicas: 1,
                properties: props(&[
                    ("metaurlSecret", "jfs-secret"),
                    ("metaurlSecretKey", "metaurl"),
                    ("formatCmd", "/usr/local/bin/juicefs format"),
                ]),
                ..Default::default()
            },
            fuse: CompTemplateSpec {
                properties: props(&[("mountPath", "/mnt/jfs")]),
                ..Default::default()
            },
            ..Default::default()
        },
        status: Some(RuntimeStatus {
            cache_states: props(cache_states),
            master_phase,
            ..Default::default()
        }),
    }
}
