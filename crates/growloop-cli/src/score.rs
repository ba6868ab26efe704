//! `score` command: candidates file in, outreach batch artifact out.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use growloop_scoring::{dedup_by_handle, format_batch, score_all, Candidate};
use serde_json::Value;
use tracing::info;

use crate::context::{read_json, take_list, AppContext};

pub(crate) fn run_score(ctx: &AppContext, input: &Path) -> anyhow::Result<()> {
    let list = take_list(read_json(input)?, "candidates", input)?;
    let candidates: Vec<Candidate> =
        serde_json::from_value(list).context("candidates do not match the expected shape")?;

    let now = Utc::now();
    let (scored, summary) = score_all(candidates, &ctx.pipeline.scoring, now);
    let unique = dedup_by_handle(scored);
    info!(
        total = summary.total,
        qualified = summary.qualified,
        below_threshold = summary.below_threshold,
        unique = unique.len(),
        "scored candidates"
    );

    let contacted = load_contacted(ctx)?;
    let batch = format_batch(&unique, &contacted, now);

    let value = serde_json::to_value(&batch)?;
    let path = ctx
        .artifacts
        .save("prospects", "prospects", now.date_naive(), &value)?;
    info!(
        path = %path.display(),
        immediate = summary.by_tier.immediate,
        batch = summary.by_tier.batch,
        "saved prospect batch"
    );

    Ok(())
}

/// Lowercased handles already reached out to, from `contacted.json` at the
/// data root. A missing or unreadable file means nobody was contacted yet.
fn load_contacted(ctx: &AppContext) -> anyhow::Result<BTreeSet<String>> {
    let path = ctx.artifacts.root().join("contacted.json");
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(BTreeSet::new());
    };

    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let handles = value["contacted"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e["handle"].as_str())
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default();
    Ok(handles)
}
