//! `track` command: weekly metrics in, metrics artifact out, plus a
//! model-generated insights artifact when an API key is available.

use std::path::Path;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use growloop_llm::parse_json_response;
use growloop_tracker::{build_metrics_artifact, MetricsArtifact, WeeklyMetrics};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::context::{read_json, AppContext};

const ANALYZE_PROMPT: &str = include_str!("../prompts/analyze-performance.md");

pub(crate) async fn run_track(ctx: &AppContext, input: &Path) -> anyhow::Result<()> {
    let metrics_input: WeeklyMetrics = serde_json::from_value(read_json(input)?)
        .context("weekly metrics do not match the expected shape")?;
    if metrics_input.posts.is_empty() {
        anyhow::bail!("no posts in {}", input.display());
    }

    let now = Utc::now();
    let artifact = build_metrics_artifact(&metrics_input, &ctx.pipeline, now);
    info!(
        week_of = %artifact.week_of,
        posts = artifact.total_posts,
        "aggregated weekly metrics"
    );

    let date = artifact
        .week_of
        .parse::<NaiveDate>()
        .unwrap_or_else(|_| now.date_naive());
    let metrics_value = serde_json::to_value(&artifact)?;
    let path = ctx
        .artifacts
        .save("metrics", "metrics", date, &metrics_value)?;
    info!(path = %path.display(), "saved metrics artifact");

    if ctx.config.anthropic_api_key.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; skipping model analysis");
        return Ok(());
    }

    let client = ctx.llm_client()?;
    let prompt = build_analysis_prompt(&artifact)?;
    let text = client.complete(&prompt).await?;
    let analysis: Value = parse_json_response(&text)?;

    let mut insights = json!({
        "week_of": artifact.week_of,
        "generated_at": now,
        "follower_changes": artifact.follower_changes,
        "aggregations": artifact.aggregations,
        "performers": artifact.performers,
    });
    if let (Some(target), Some(extra)) = (insights.as_object_mut(), analysis.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }

    let path = ctx.artifacts.save("insights", "insights", date, &insights)?;
    info!(path = %path.display(), "saved insights artifact");

    Ok(())
}

fn build_analysis_prompt(artifact: &MetricsArtifact) -> anyhow::Result<String> {
    Ok(ANALYZE_PROMPT
        .replace(
            "{{by_platform}}",
            &serde_json::to_string_pretty(&artifact.aggregations.by_platform)?,
        )
        .replace(
            "{{by_content_type}}",
            &serde_json::to_string_pretty(&artifact.aggregations.by_content_type)?,
        )
        .replace(
            "{{by_pillar}}",
            &serde_json::to_string_pretty(&artifact.aggregations.by_pillar)?,
        )
        .replace(
            "{{by_posting_time}}",
            &serde_json::to_string_pretty(&artifact.aggregations.by_posting_time)?,
        )
        .replace(
            "{{top_performers}}",
            &serde_json::to_string_pretty(&artifact.performers.top)?,
        )
        .replace(
            "{{underperformers}}",
            &serde_json::to_string_pretty(&artifact.performers.bottom)?,
        ))
}
