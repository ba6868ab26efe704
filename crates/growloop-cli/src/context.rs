//! Shared command context: configuration plus the artifact and state stores.

use std::fs;
use std::path::Path;

use anyhow::Context;
use growloop_core::{load_pipeline_config, AppConfig, PipelineConfig};
use growloop_llm::LlmClient;
use growloop_store::{ArtifactStore, StateStore};
use serde_json::Value;

pub(crate) struct AppContext {
    pub config: AppConfig,
    pub pipeline: PipelineConfig,
    pub artifacts: ArtifactStore,
    pub state: StateStore,
}

impl AppContext {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let pipeline = load_pipeline_config(&config.pipeline_path)?;
        pipeline.validate()?;

        let artifacts = ArtifactStore::new(&config.data_dir);
        let state = StateStore::new(config.data_dir.join("state").join("campaign-state.json"));

        Ok(Self {
            config,
            pipeline,
            artifacts,
            state,
        })
    }

    /// Build the model client. Commands that call the model fail fast here
    /// when no API key is configured.
    pub fn llm_client(&self) -> anyhow::Result<LlmClient> {
        let api_key = self
            .config
            .anthropic_api_key
            .as_deref()
            .context("ANTHROPIC_API_KEY is not set; this command calls the model")?;
        Ok(LlmClient::new(
            api_key,
            &self.config.model,
            self.config.max_tokens,
        )?)
    }
}

/// Read and parse a JSON input file.
pub(crate) fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("input file {} is not valid JSON", path.display()))
}

/// Unwrap `{ "<key>": [...] }` or accept a bare array.
pub(crate) fn take_list(value: Value, key: &str, path: &Path) -> anyhow::Result<Value> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(mut map) => map
            .remove(key)
            .with_context(|| format!("{} has no `{key}` array", path.display())),
        _ => anyhow::bail!("{} must be a JSON array or object", path.display()),
    }
}
