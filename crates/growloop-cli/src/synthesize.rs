//! `synthesize` command: classify feedback, cluster it and write the
//! synthesis report.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use growloop_feedback::{
    classify_all, generate_report, Clusterer, FeedbackItem, LlmClusterer, NoiseFilter,
};
use tracing::info;

use crate::context::{read_json, take_list, AppContext};

pub(crate) async fn run_synthesize(ctx: &AppContext, input: &Path) -> anyhow::Result<()> {
    let list = take_list(read_json(input)?, "feedback_items", input)?;
    let items: Vec<FeedbackItem> =
        serde_json::from_value(list).context("feedback items do not match the expected shape")?;
    if items.is_empty() {
        anyhow::bail!("no feedback items in {}", input.display());
    }

    let client = ctx.llm_client()?;
    let filter = NoiseFilter::new(&ctx.pipeline.noise)?;

    let (classified, summary) = classify_all(
        &client,
        items,
        &filter,
        &ctx.pipeline.noise.weights,
        ctx.config.llm_rate_limit_ms,
    )
    .await;
    info!(
        classified = summary.classified,
        skipped = summary.skipped,
        errored = summary.errored,
        "classification finished"
    );

    let clusterer = LlmClusterer::new(client, ctx.pipeline.noise.weights.clone());
    let outcome = clusterer.synthesize(&classified).await;

    let now = Utc::now();
    let report = generate_report(&classified, outcome, now);
    info!(
        insights = report.insights.len(),
        top_priorities = report.top_priorities.len(),
        "synthesis report assembled"
    );

    let value = serde_json::to_value(&report)?;
    let path = ctx
        .artifacts
        .save("feedback", "synthesis-report", now.date_naive(), &value)?;
    info!(path = %path.display(), "saved synthesis report");

    Ok(())
}
