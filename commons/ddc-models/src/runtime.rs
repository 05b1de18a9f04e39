use std::collections::BTreeMap;
use std::fmt::Debug;

use k8s_openapi::NamespaceResourceScope;
use kube::{CustomResource, Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::constants::{JINDO_CACHE_RUNTIME, JINDO_RUNTIME, JUICEFS_RUNTIME};
use crate::dataset::{Category, RuntimeSummary};

/// Common view over every cache runtime kind.
///
/// A runtime matches the dataset with the same name and namespace.
pub trait CacheRuntime:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Value reported as `type` in the dataset's runtime summaries.
    const RUNTIME_TYPE: &'static str;

    fn master_replicas(&self) -> i32;

    fn runtime_status(&self) -> Option<&RuntimeStatus>;

    fn cache_states(&self) -> BTreeMap<String, String> {
        self.runtime_status()
            .map(|s| s.cache_states.clone())
            .unwrap_or_default()
    }

    fn master_ready(&self) -> bool {
        self.runtime_status()
            .map(|s| s.master_phase == RuntimePhase::Ready)
            .unwrap_or(false)
    }

    /// Summary entry built from the runtime's identity and current spec.
    fn summary(&self) -> RuntimeSummary {
        RuntimeSummary {
            name: self.name_any(),
            namespace: self.namespace().unwrap_or_default(),
            category: Category::Accelerate,
            type_: Self::RUNTIME_TYPE.to_string(),
            master_replicas: self.master_replicas(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    /// Authoritative cache state of the runtime, keyed by cache-state name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cache_states: BTreeMap<String, String>,
    #[serde(default)]
    pub master_phase: RuntimePhase,
    #[serde(default)]
    pub worker_phase: RuntimePhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_number_ready: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum RuntimePhase {
    #[default]
    #[serde(rename = "")]
    None,
    NotReady,
    PartialReady,
    Ready,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompTemplateSpec {
    #[serde(default)]
    pub replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "data.fluid.io",
    version = "v1alpha1",
    kind = "JindoRuntime",
    plural = "jindoruntimes",
    namespaced,
    status = "RuntimeStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct JindoRuntimeSpec {
    #[serde(default)]
    pub master: CompTemplateSpec,
    #[serde(default)]
    pub worker: CompTemplateSpec,
    #[serde(default)]
    pub fuse: CompTemplateSpec,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "data.fluid.io",
    version = "v1alpha1",
    kind = "JindoCacheRuntime",
    plural = "jindocacheruntimes",
    namespaced,
    status = "RuntimeStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct JindoCacheRuntimeSpec {
    #[serde(default)]
    pub master: CompTemplateSpec,
    #[serde(default)]
    pub worker: CompTemplateSpec,
    #[serde(default)]
    pub fuse: CompTemplateSpec,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "data.fluid.io",
    version = "v1alpha1",
    kind = "JuiceFSRuntime",
    plural = "juicefsruntimes",
    namespaced,
    status = "RuntimeStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct JuiceFsRuntimeSpec {
    #[serde(default)]
    pub master: CompTemplateSpec,
    #[serde(default)]
    pub worker: CompTemplateSpec,
    #[serde(default)]
    pub fuse: CompTemplateSpec,
}

impl CacheRuntime for JindoRuntime {
    const RUNTIME_TYPE: &'static str = JINDO_RUNTIME;

    fn master_replicas(&self) -> i32 {
        self.spec.master.replicas
    }

    fn runtime_status(&self) -> Option<&RuntimeStatus> {
        self.status.as_ref()
    }
}

impl CacheRuntime for JindoCacheRuntime {
    const RUNTIME_TYPE: &'static str = JINDO_CACHE_RUNTIME;

    fn master_replicas(&self) -> i32 {
        self.spec.master.replicas
    }

    fn runtime_status(&self) -> Option<&RuntimeStatus> {
        self.status.as_ref()
    }
}

impl CacheRuntime for JuiceFSRuntime {
    const RUNTIME_TYPE: &'static str = JUICEFS_RUNTIME;

    fn master_replicas(&self) -> i32 {
        self.spec.master.replicas
    }

    fn runtime_status(&self) -> Option<&RuntimeStatus> {
        self.status.as_ref()
    }
}
