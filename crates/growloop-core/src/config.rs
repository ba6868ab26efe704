use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if env var values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if env var values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let anthropic_api_key = lookup("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty());

    let model = or_default("GROWLOOP_MODEL", "claude-sonnet-4-20250514");
    let max_tokens = parse_u32("GROWLOOP_MAX_TOKENS", "2048")?;
    let llm_rate_limit_ms = parse_u64("GROWLOOP_LLM_RATE_LIMIT_MS", "1000")?;
    let data_dir = PathBuf::from(or_default("GROWLOOP_DATA_DIR", "./data"));
    let pipeline_path = PathBuf::from(or_default(
        "GROWLOOP_PIPELINE_PATH",
        "./config/pipeline.yaml",
    ));
    let log_level = or_default("GROWLOOP_LOG_LEVEL", "info");

    Ok(AppConfig {
        anthropic_api_key,
        model,
        max_tokens,
        llm_rate_limit_ms,
        data_dir,
        pipeline_path,
        log_level,
    })
}
