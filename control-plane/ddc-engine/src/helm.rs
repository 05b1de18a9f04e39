use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::error::EngineError;

const RELEASE_NOT_FOUND: &str = "release: not found";

/// Package-manager seam used by the provisioner.
#[async_trait]
pub trait ReleaseManager: Send + Sync {
    async fn release_exists(&self, name: &str, namespace: &str) -> Result<bool, EngineError>;

    async fn install_release(
        &self,
        name: &str,
        namespace: &str,
        values_file: &Path,
        chart: &Path,
    ) -> Result<(), EngineError>;
}

/// Drives the `helm` binary.
#[derive(Clone, Debug)]
pub struct HelmCli {
    binary: String,
}

impl HelmCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.helm_binary.clone())
    }
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new("helm")
    }
}

#[async_trait]
impl ReleaseManager for HelmCli {
    /// `helm status` exits 1 on every failure; only a `release: not found`
    /// message means the release is absent.
    #[instrument(skip(self))]
    async fn release_exists(&self, name: &str, namespace: &str) -> Result<bool, EngineError> {
        let output = Command::new(&self.binary)
            .args(["status", name, "-n", namespace])
            .output()
            .await
            .map_err(|e| EngineError::Helm(format!("{}: {}", self.binary, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) if stderr.contains(RELEASE_NOT_FOUND) => {
                debug!("release not found");
                Ok(false)
            }
            _ => Err(EngineError::Helm(format!(
                "helm status {} -n {} failed ({}): {}",
                name,
                namespace,
                output.status,
                stderr.trim()
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn install_release(
        &self,
        name: &str,
        namespace: &str,
        values_file: &Path,
        chart: &Path,
    ) -> Result<(), EngineError> {
        let output = Command::new(&self.binary)
            .arg("install")
            .arg("-f")
            .arg(values_file)
            .args(["--namespace", namespace, name])
            .arg(chart)
            .output()
            .await
            .map_err(|e| EngineError::Helm(format!("{}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(EngineError::Helm(format!(
                "helm install {} failed ({}): {}",
                name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        info!("release installed");
        Ok(())
    }
}
