//! `feedback` command: route the latest insights artifact into context files
//! for the content generator and the trend scout.

use std::fs;

use anyhow::Context;
use chrono::Utc;
use growloop_tracker::{content_feedback, scout_feedback, InsightsReport};
use tracing::info;

use crate::context::AppContext;

pub(crate) fn run_feedback(ctx: &AppContext) -> anyhow::Result<()> {
    let artifact = ctx.artifacts.latest("insights", "insights")?.context(
        "no insights artifact found; run `growloop track` with an API key first",
    )?;
    info!(path = %artifact.path.display(), "routing insights");

    let report: InsightsReport = serde_json::from_value(artifact.value)
        .context("insights artifact does not match the expected shape")?;

    let now = Utc::now();
    let content = content_feedback(&report, now);
    let scout = scout_feedback(&report, now);

    let dir = ctx.artifacts.root().join("context");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create context directory {}", dir.display()))?;

    let content_path = dir.join("content-generator-context.json");
    fs::write(&content_path, serde_json::to_string_pretty(&content)?)
        .with_context(|| format!("failed to write {}", content_path.display()))?;
    info!(
        path = %content_path.display(),
        top_formats = ?content.performance_context.top_formats,
        top_pillars = ?content.performance_context.top_pillars,
        "saved content generator context"
    );

    let scout_path = dir.join("scout-context.json");
    fs::write(&scout_path, serde_json::to_string_pretty(&scout)?)
        .with_context(|| format!("failed to write {}", scout_path.display()))?;
    info!(
        path = %scout_path.display(),
        validated = scout.validated_trends.len(),
        underperforming = scout.underperforming_trends.len(),
        "saved scout context"
    );

    Ok(())
}
