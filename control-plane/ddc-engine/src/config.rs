use std::path::{Path, PathBuf};
use std::time::Duration;

use envconfig::Envconfig;

use crate::retry::ConflictRetry;

const DEFAULT_CHARTS_DIR: &str = "/charts";

#[derive(Envconfig, Clone, Debug)]
pub struct EngineConfig {
    /// Chart root; falls back to `$HOME/charts`, then `/charts`.
    /// Env: DDC_CHARTS_DIR
    #[envconfig(from = "DDC_CHARTS_DIR")]
    pub charts_dir: Option<String>,

    #[envconfig(from = "DDC_HELM_BIN", default = "helm")]
    pub helm_binary: String,

    /// Where generated values files are written (system temp dir when unset).
    /// Env: DDC_VALUES_DIR
    #[envconfig(from = "DDC_VALUES_DIR")]
    pub values_dir: Option<String>,

    #[envconfig(nested)]
    pub conflict_retry: ConflictRetryConfig,
}

#[derive(Envconfig, Clone, Debug)]
pub struct ConflictRetryConfig {
    /// 0 retries until success, a non-conflict error, or cancellation
    #[envconfig(from = "DDC_CONFLICT_RETRY_MAX_ATTEMPTS", default = "0")]
    pub max_attempts: u32,
    #[envconfig(from = "DDC_CONFLICT_RETRY_INITIAL_MS", default = "10")]
    pub initial_delay_ms: u64,
    #[envconfig(from = "DDC_CONFLICT_RETRY_MAX_DELAY_MS", default = "1000")]
    pub max_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            charts_dir: None,
            helm_binary: "helm".into(),
            values_dir: None,
            conflict_retry: ConflictRetryConfig::default(),
        }
    }
}

impl Default for ConflictRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay_ms: 10,
            max_delay_ms: 1000,
        }
    }
}

impl EngineConfig {
    pub fn charts_directory(&self) -> PathBuf {
        if let Some(dir) = self.charts_dir.as_deref().filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(home) = std::env::var_os("HOME") {
            let home_charts = Path::new(&home).join("charts");
            if home_charts.exists() {
                return home_charts;
            }
        }
        PathBuf::from(DEFAULT_CHARTS_DIR)
    }

    /// Chart directory of one engine implementation.
    pub fn chart_path(&self, engine_impl: &str) -> PathBuf {
        self.charts_directory().join(engine_impl)
    }

    pub fn values_directory(&self) -> PathBuf {
        self.values_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl ConflictRetryConfig {
    pub fn policy(&self) -> ConflictRetry {
        ConflictRetry {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..ConflictRetry::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_charts_dir_wins() {
        let cfg = EngineConfig {
            charts_dir: Some("/opt/charts".into()),
            ..Default::default()
        };
        assert_eq!(cfg.charts_directory(), PathBuf::from("/opt/charts"));
        assert_eq!(
            cfg.chart_path("jindocache"),
            PathBuf::from("/opt/charts/jindocache")
        );
    }

    #[test]
    fn empty_values_dir_falls_back_to_temp() {
        let cfg = EngineConfig {
            values_dir: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(cfg.values_directory(), std::env::temp_dir());
    }

    #[test]
    fn loads_from_env_map() {
        let env = std::collections::HashMap::from([
            ("DDC_CHARTS_DIR".to_string(), "/srv/charts".to_string()),
            ("DDC_HELM_BIN".to_string(), "/usr/local/bin/helm3".to_string()),
            ("DDC_CONFLICT_RETRY_MAX_ATTEMPTS".to_string(), "4".to_string()),
        ]);
        let cfg = EngineConfig::init_from_hashmap(&env).unwrap();
        assert_eq!(cfg.chart_path("juicefs"), PathBuf::from("/srv/charts/juicefs"));
        assert_eq!(cfg.helm_binary, "/usr/local/bin/helm3");
        assert!(cfg.values_dir.is_none());
        assert_eq!(cfg.conflict_retry.max_attempts, 4);
        assert_eq!(cfg.conflict_retry.initial_delay_ms, 10);
    }

    #[test]
    fn retry_policy_from_config() {
        let cfg = ConflictRetryConfig {
            max_attempts: 3,
            initial_delay_ms: 5,
            max_delay_ms: 50,
        };
        let policy = cfg.policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(5));
        assert_eq!(policy.max_delay, Duration::from_millis(50));
    }
}
