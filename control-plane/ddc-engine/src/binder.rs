use std::marker::PhantomData;

use chrono::Utc;
use ddc_models::{CacheRuntime, Dataset, DatasetPhase};
use ddc_store::ObjectStore;
use tracing::{debug, info, instrument};

use crate::context::EngineContext;
use crate::error::EngineError;
use crate::mirror::{compute_status, phase_condition, upsert_condition};
use crate::retry::retry_on_conflict;

/// Keeps a dataset's status in line with its runtime `R`.
///
/// Every operation reads the dataset and the runtime fresh, computes the next
/// status and writes it back in a single status replace. A lost version race
/// restarts from the read.
pub struct DatasetBinder<S, R> {
    ctx: EngineContext<S>,
    _runtime: PhantomData<fn() -> R>,
}

impl<S, R> DatasetBinder<S, R>
where
    S: ObjectStore,
    R: CacheRuntime,
{
    pub fn new(ctx: EngineContext<S>) -> Self {
        Self {
            ctx,
            _runtime: PhantomData,
        }
    }

    pub fn context(&self) -> &EngineContext<S> {
        &self.ctx
    }

    /// Mark the dataset Bound once its runtime is ready to serve.
    #[instrument(skip_all, fields(ns = %self.ctx.namespace, name = %self.ctx.name))]
    pub async fn bind_to_dataset(&self) -> Result<(), EngineError> {
        info!("binding dataset to runtime {}", R::RUNTIME_TYPE);
        self.sync_status(Some(DatasetPhase::Bound)).await
    }

    /// Force the dataset into `phase`, refreshing cache state alongside.
    #[instrument(skip_all, fields(ns = %self.ctx.namespace, name = %self.ctx.name, %phase))]
    pub async fn update_dataset_status(&self, phase: DatasetPhase) -> Result<(), EngineError> {
        self.sync_status(Some(phase)).await
    }

    /// Refresh cache states and runtime summaries, leaving the phase alone.
    #[instrument(skip_all, fields(ns = %self.ctx.namespace, name = %self.ctx.name))]
    pub async fn update_cache_of_dataset(&self) -> Result<(), EngineError> {
        self.sync_status(None).await
    }

    /// Phase currently stored on the dataset.
    pub async fn current_phase(&self) -> Result<DatasetPhase, EngineError> {
        self.ctx.ensure_active()?;
        let dataset: Dataset = self
            .ctx
            .store
            .get(&self.ctx.namespace, &self.ctx.name)
            .await?;
        Ok(dataset.status.map(|s| s.phase).unwrap_or_default())
    }

    async fn sync_status(&self, requested_phase: Option<DatasetPhase>) -> Result<(), EngineError> {
        retry_on_conflict(
            &self.ctx.retry,
            &self.ctx.cancel,
            "update dataset status",
            move || self.try_sync_status(requested_phase),
        )
        .await
    }

    async fn try_sync_status(&self, requested_phase: Option<DatasetPhase>) -> Result<(), EngineError> {
        let ctx = &self.ctx;

        ctx.ensure_active()?;
        let dataset: Dataset = ctx.store.get(&ctx.namespace, &ctx.name).await?;
        ctx.ensure_active()?;
        let runtime: R = ctx.store.get(&ctx.namespace, &ctx.name).await?;

        let current = dataset.status.clone().unwrap_or_default();
        let mut next = compute_status(
            &current,
            runtime.summary(),
            &runtime.cache_states(),
            requested_phase,
        );
        if let Some(phase) = requested_phase {
            let now = Utc::now().to_rfc3339();
            next.conditions = upsert_condition(&next.conditions, phase_condition(phase, &now));
        }

        if dataset.status.as_ref() == Some(&next) {
            debug!("dataset status unchanged; skipping write");
            return Ok(());
        }

        let phase = next.phase;
        let cache_keys = next.cache_states.len();
        let mut to_update = dataset;
        to_update.status = Some(next);

        ctx.ensure_active()?;
        ctx.store.replace_status(&to_update).await?;
        info!(%phase, cache_keys, "dataset status updated");
        Ok(())
    }
}
