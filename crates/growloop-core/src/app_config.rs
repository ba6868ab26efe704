use std::path::PathBuf;

/// Operational configuration loaded from environment variables.
///
/// Tunables that describe the pipeline itself (scoring weights, platform
/// metric fields, schedule targets) live in the YAML pipeline config; this
/// struct only carries deployment concerns.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Anthropic API key. Optional at load time — commands that call the
    /// model fail fast when it is absent, commands that do not keep working.
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Fixed delay between consecutive model calls within one batch.
    pub llm_rate_limit_ms: u64,
    /// Root directory for all date-stamped JSON artifacts and the state file.
    pub data_dir: PathBuf,
    pub pipeline_path: PathBuf,
    pub log_level: String,
}
