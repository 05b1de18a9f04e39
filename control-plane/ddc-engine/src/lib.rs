pub mod binder;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod helm;
pub mod mirror;
pub mod provision;
pub mod retry;
pub mod tracking;
pub mod values;

pub use binder::DatasetBinder;
pub use config::EngineConfig;
pub use context::EngineContext;
pub use engine::{CacheEngine, CycleReport, DatasetSync};
pub use error::{EngineError, TransformError};
pub use helm::{HelmCli, ReleaseManager};
pub use provision::{ProvisionOutcome, ReleaseProvisioner, ValuesTransformer};
