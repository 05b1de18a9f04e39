use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::API_VERSION;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "data.fluid.io",
    version = "v1alpha1",
    kind = "Dataset",
    plural = "datasets",
    namespaced,
    status = "DatasetStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSpec {
    /// Underlying storage mounted into the dataset
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mount {
    pub mount_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Observed state of a dataset.
///
/// `cache_states` and `runtimes` are mirrored from the bound runtime; `hcfs`
/// belongs to the HCFS subsystem and is only ever carried forward here.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatus {
    #[serde(default)]
    pub phase: DatasetPhase,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cache_states: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtimes: Vec<RuntimeSummary>,
    #[serde(default, rename = "hcfs", skip_serializing_if = "Option::is_none")]
    pub hcfs_status: Option<HcfsStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<DatasetCondition>,
}

#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, JsonSchema,
)]
pub enum DatasetPhase {
    #[default]
    #[serde(rename = "")]
    None,
    Bound,
    NotBound,
    Pending,
    Failed,
    Updating,
}

impl fmt::Display for DatasetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetPhase::None => write!(f, "None"),
            DatasetPhase::Bound => write!(f, "Bound"),
            DatasetPhase::NotBound => write!(f, "NotBound"),
            DatasetPhase::Pending => write!(f, "Pending"),
            DatasetPhase::Failed => write!(f, "Failed"),
            DatasetPhase::Updating => write!(f, "Updating"),
        }
    }
}

/// One entry per runtime bound to the dataset.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSummary {
    pub name: String,
    pub namespace: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub master_replicas: i32,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
pub enum Category {
    #[default]
    Accelerate,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HcfsStatus {
    /// Endpoint for accessing the dataset through HCFS
    pub endpoint: String,
    /// Underlayer HCFS compatible version
    pub underlayer_file_system_version: String,
}

pub const CONDITION_READY: &str = "Ready";
pub const REASON_DATASET_READY: &str = "DatasetReady";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCondition {
    /// Condition type; other subsystems may add their own types
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Dataset id used to label owned records: the UID when known, otherwise
/// `<namespace>-<name>`.
pub fn dataset_id(namespace: &str, name: &str, uid: Option<&str>) -> String {
    match uid {
        Some(uid) if !uid.is_empty() => uid.to_string(),
        _ => format!("{}-{}", namespace, name),
    }
}

/// Controller owner reference pointing at the dataset `name` with `uid`.
pub fn dataset_owner_reference(name: &str, uid: &str) -> OwnerReference {
    OwnerReference {
        api_version: API_VERSION.to_string(),
        kind: "Dataset".to_string(),
        name: name.to_string(),
        uid: uid.to_string(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}
