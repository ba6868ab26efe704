mod app_config;
mod config;
mod pipeline;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use pipeline::{
    load_pipeline_config, EngagementThresholds, HourRange, InsightSettings, MixBucket,
    NoiseConfig, NoiseWeights, PipelineConfig, PlatformMetrics, PlatformTarget, ScheduleConfig,
    ScoringConfig, ScoringWeights, TierBreakpoints, DAYS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pipeline config at {path}: {source}")]
    PipelineFileIo {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    PipelineFileParse(#[from] serde_yaml::Error),

    #[error("pipeline config validation failed: {0}")]
    Validation(String),
}
