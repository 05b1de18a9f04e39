use std::io::Write;
use std::path::{Path, PathBuf};

use ddc_models::Dataset;
use ddc_store::ObjectStore;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::error::{EngineError, TransformError};
use crate::helm::ReleaseManager;
use crate::tracking::{build_values_record, encode_values, values_record_name};

/// Engine-specific translation of a runtime into chart values.
pub trait ValuesTransformer<R>: Send + Sync {
    type Values: Serialize + Send + Sync;

    fn transform(&self, runtime: &R) -> Result<Self::Values, TransformError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Installed,
    AlreadyInstalled,
}

/// Installs the master release of one runtime and keeps its tracking record.
pub struct ReleaseProvisioner<S, H, T> {
    ctx: EngineContext<S>,
    helm: H,
    transformer: T,
    charts_dir: PathBuf,
    values_dir: PathBuf,
}

impl<S, H, T> ReleaseProvisioner<S, H, T>
where
    S: ObjectStore,
    H: ReleaseManager,
{
    pub fn new(ctx: EngineContext<S>, helm: H, transformer: T, cfg: &EngineConfig) -> Self {
        Self {
            ctx,
            helm,
            transformer,
            charts_dir: cfg.charts_directory(),
            values_dir: cfg.values_directory(),
        }
    }

    pub fn context(&self) -> &EngineContext<S> {
        &self.ctx
    }

    pub fn values_record_name(&self) -> String {
        values_record_name(&self.ctx.name, &self.ctx.engine_impl)
    }

    pub fn chart_path(&self) -> PathBuf {
        self.charts_dir.join(&self.ctx.engine_impl)
    }

    /// Install the master release unless one with the runtime's name already
    /// exists. The values file and tracking record are regenerated either way.
    #[instrument(skip_all, fields(ns = %self.ctx.namespace, name = %self.ctx.name, engine = %self.ctx.engine_impl))]
    pub async fn setup_master_internal<R>(&self, runtime: &R) -> Result<ProvisionOutcome, EngineError>
    where
        T: ValuesTransformer<R>,
    {
        let chart = self.chart_path();
        let values_file = self.generate_values_file(runtime).await?;

        self.ctx.ensure_active()?;
        if self
            .helm
            .release_exists(&self.ctx.name, &self.ctx.namespace)
            .await?
        {
            info!("the release is already installed");
            return Ok(ProvisionOutcome::AlreadyInstalled);
        }

        self.ctx.ensure_active()?;
        self.helm
            .install_release(&self.ctx.name, &self.ctx.namespace, &values_file, &chart)
            .await?;
        info!(chart = %chart.display(), "master release installed");
        Ok(ProvisionOutcome::Installed)
    }

    /// Render the runtime's values to a private temp file and republish them
    /// as the tracking record. Returns the file path.
    pub async fn generate_values_file<R>(&self, runtime: &R) -> Result<PathBuf, EngineError>
    where
        T: ValuesTransformer<R>,
    {
        let owner_uid = self.owner_dataset_uid().await?;
        let record_name = self.values_record_name();
        self.remove_stale_record(&record_name).await?;

        let values = self.transformer.transform(runtime)?;
        let data = encode_values(&values)?;
        let path = self.write_values_file(&data)?;
        debug!(values_file = %path.display(), "saved the values file");

        self.ctx.ensure_active()?;
        let record = build_values_record(
            &record_name,
            &self.ctx.namespace,
            data,
            &self.ctx.name,
            owner_uid.as_deref(),
        );
        self.ctx.store.create(&record).await?;
        Ok(path)
    }

    /// UID of the owning dataset: the one configured on the context, else
    /// read from the dataset itself.
    async fn owner_dataset_uid(&self) -> Result<Option<String>, EngineError> {
        if let Some(uid) = self.ctx.owner_dataset_uid.as_deref().filter(|u| !u.is_empty()) {
            return Ok(Some(uid.to_string()));
        }
        self.ctx.ensure_active()?;
        let dataset: Dataset = self
            .ctx
            .store
            .get(&self.ctx.namespace, &self.ctx.name)
            .await?;
        debug!(uid = ?dataset.metadata.uid, "resolved owning dataset");
        Ok(dataset.metadata.uid)
    }

    async fn remove_stale_record(&self, record_name: &str) -> Result<(), EngineError> {
        self.ctx.ensure_active()?;
        match self
            .ctx
            .store
            .delete::<ConfigMap>(&self.ctx.namespace, record_name)
            .await
        {
            Ok(()) => debug!(record = %record_name, "removed previous values record"),
            Err(e) if e.is_not_found() => debug!(record = %record_name, "no previous values record"),
            Err(e) => error!(record = %record_name, error = %e, "failed to clean values record"),
        }
        Ok(())
    }

    fn write_values_file(&self, data: &str) -> Result<PathBuf, EngineError> {
        let prefix = values_record_name(&self.ctx.name, &self.ctx.engine_impl);
        let io_err = |path: &Path, source| EngineError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".yaml")
            .tempfile_in(&self.values_dir)
            .map_err(|e| io_err(self.values_dir.as_path(), e))?;
        file.write_all(data.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| io_err(file.path(), e))?;

        let (_, path) = file.keep().map_err(|e| {
            warn!(error = %e, "failed to keep values file");
            io_err(e.file.path(), e.error)
        })?;
        Ok(path)
    }
}
