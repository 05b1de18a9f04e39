use std::collections::BTreeMap;

use ddc_models::{
    CONDITION_READY, ConditionStatus, DatasetCondition, DatasetPhase, DatasetStatus,
    REASON_DATASET_READY, RuntimeSummary,
};

/// Next dataset status given the bound runtime's current state.
///
/// - `requested_phase` is applied verbatim when present, otherwise the stored
///   phase is kept.
/// - `cache_states` is replaced wholesale; keys the runtime no longer reports
///   disappear.
/// - `runtimes` holds exactly the reconciling runtime.
/// - `hcfs_status` and `conditions` are carried over untouched.
pub fn compute_status(
    current: &DatasetStatus,
    runtime: RuntimeSummary,
    runtime_cache_states: &BTreeMap<String, String>,
    requested_phase: Option<DatasetPhase>,
) -> DatasetStatus {
    DatasetStatus {
        phase: requested_phase.unwrap_or(current.phase),
        cache_states: runtime_cache_states.clone(),
        runtimes: vec![runtime],
        hcfs_status: current.hcfs_status.clone(),
        conditions: current.conditions.clone(),
    }
}

/// Ready condition recorded when a phase is forced.
pub fn phase_condition(phase: DatasetPhase, now: &str) -> DatasetCondition {
    let (status, message) = match phase {
        DatasetPhase::Bound => (ConditionStatus::True, "The ddc runtime is ready."),
        DatasetPhase::Failed => (ConditionStatus::False, "The ddc runtime is not ready."),
        _ => (ConditionStatus::False, "The ddc runtime is unknown."),
    };
    DatasetCondition {
        type_: CONDITION_READY.to_string(),
        status,
        reason: REASON_DATASET_READY.to_string(),
        message: message.to_string(),
        last_update_time: Some(now.to_string()),
        last_transition_time: Some(now.to_string()),
    }
}

/// Replace the condition of the same type, keeping every other type in place.
/// The transition time survives when the status value did not change.
pub fn upsert_condition(
    existing: &[DatasetCondition],
    mut incoming: DatasetCondition,
) -> Vec<DatasetCondition> {
    let mut out = existing.to_vec();
    match out.iter().position(|c| c.type_ == incoming.type_) {
        Some(idx) => {
            if out[idx].status == incoming.status {
                incoming.last_transition_time = out[idx].last_transition_time.clone();
            }
            out[idx] = incoming;
        }
        None => out.push(incoming),
    }
    out
}
