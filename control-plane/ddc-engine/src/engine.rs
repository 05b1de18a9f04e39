use ddc_models::{CacheRuntime, DatasetPhase};
use ddc_store::ObjectStore;
use tracing::{debug, info, instrument};

use crate::binder::DatasetBinder;
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::EngineError;
use crate::helm::ReleaseManager;
use crate::provision::{ProvisionOutcome, ReleaseProvisioner, ValuesTransformer};

/// What one reconcile cycle did to the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSync {
    /// Runtime became ready and the dataset was bound.
    Bound,
    /// Dataset was already bound; cache states refreshed.
    Refreshed,
    /// Master not ready yet; dataset left untouched.
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub provision: ProvisionOutcome,
    pub dataset: DatasetSync,
}

/// Cache engine for one (dataset, runtime) pair: provisions the master
/// release, then binds the dataset once the master reports ready.
pub struct CacheEngine<S, H, T, R> {
    binder: DatasetBinder<S, R>,
    provisioner: ReleaseProvisioner<S, H, T>,
}

impl<S, H, T, R> CacheEngine<S, H, T, R>
where
    S: ObjectStore,
    H: ReleaseManager,
    T: ValuesTransformer<R>,
    R: CacheRuntime,
{
    pub fn new(ctx: EngineContext<S>, helm: H, transformer: T, cfg: &EngineConfig) -> Self {
        Self {
            binder: DatasetBinder::new(ctx.clone()),
            provisioner: ReleaseProvisioner::new(ctx, helm, transformer, cfg),
        }
    }

    pub fn binder(&self) -> &DatasetBinder<S, R> {
        &self.binder
    }

    pub fn provisioner(&self) -> &ReleaseProvisioner<S, H, T> {
        &self.provisioner
    }

    #[instrument(skip_all, fields(ns = %self.binder.context().namespace, name = %self.binder.context().name))]
    pub async fn reconcile(&self) -> Result<CycleReport, EngineError> {
        let ctx = self.binder.context();
        ctx.ensure_active()?;
        let runtime: R = ctx.store.get(&ctx.namespace, &ctx.name).await?;

        let provision = self.provisioner.setup_master_internal(&runtime).await?;

        let dataset = if !runtime.master_ready() {
            debug!("master not ready, dataset left as is");
            DatasetSync::Waiting
        } else if self.binder.current_phase().await? == DatasetPhase::Bound {
            self.binder.update_cache_of_dataset().await?;
            DatasetSync::Refreshed
        } else {
            self.binder.bind_to_dataset().await?;
            DatasetSync::Bound
        };

        info!(?provision, ?dataset, "reconcile cycle finished");
        Ok(CycleReport { provision, dataset })
    }
}
