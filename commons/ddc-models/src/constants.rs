/// API group shared by datasets and every runtime kind.
pub const API_GROUP: &str = "data.fluid.io";
pub const API_VERSION: &str = "data.fluid.io/v1alpha1";

/// Runtime type names reported in `DatasetStatus.runtimes[].type`.
pub const JINDO_RUNTIME: &str = "jindo";
pub const JINDO_CACHE_RUNTIME: &str = "jindocache";
pub const JUICEFS_RUNTIME: &str = "juicefs";

/// Engine implementation names; used as chart directory and record suffix.
pub const JINDO_ENGINE_IMPL: &str = "jindo";
pub const JINDO_CACHE_ENGINE_IMPL: &str = "jindocache";
pub const JUICEFS_ENGINE_IMPL: &str = "juicefs";

// Cache state names written by engines into RuntimeStatus.cacheStates
pub const CACHE_CAPACITY: &str = "cacheCapacity";
pub const CACHED: &str = "cached";
pub const CACHED_PERCENTAGE: &str = "cachedPercentage";
pub const CACHE_HIT_RATIO: &str = "cacheHitRatio";
pub const LOCAL_HIT_RATIO: &str = "localHitRatio";
pub const REMOTE_HIT_RATIO: &str = "remoteHitRatio";
pub const CACHE_THROUGHPUT_RATIO: &str = "cacheThroughputRatio";

/// Label carried by every record owned by a dataset.
pub const LABEL_DATASET_ID: &str = "fluid.io/dataset-id";

/// Payload key of a helm values tracking record.
pub const VALUES_DATA_KEY: &str = "data";
