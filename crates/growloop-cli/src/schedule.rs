//! `schedule` command: generate next week's content slots.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use growloop_scheduler::{assign_trends, generate_repost_slots, generate_weekly_slots};
use growloop_store::week_start;
use serde_json::{json, Value};
use tracing::info;

use crate::context::{read_json, take_list, AppContext};

pub(crate) fn run_schedule(ctx: &AppContext, trends_path: Option<&Path>) -> anyhow::Result<()> {
    let schedule = &ctx.pipeline.schedule;

    let mut slots = generate_weekly_slots(schedule);
    let reposts = generate_repost_slots(schedule);
    info!(
        original = slots.len(),
        repost = reposts.len(),
        "generated weekly slots"
    );
    slots.extend(reposts);

    let trends = match trends_path {
        Some(path) => {
            let list = take_list(read_json(path)?, "trends", path)?;
            let mut trends: Vec<Value> =
                serde_json::from_value(list).context("trends must be a JSON array")?;
            trends.truncate(schedule.max_trends_to_process);
            trends
        }
        None => Vec::new(),
    };
    assign_trends(&mut slots, &trends, &mut rand::rng());

    let now = Utc::now();
    let queue = json!({
        "generated_at": now,
        "week_of": week_start(now.date_naive()).to_string(),
        "trends_assigned": trends.len(),
        "slots": slots,
    });
    let path = ctx
        .artifacts
        .save("queue", "content-queue", now.date_naive(), &queue)?;

    for (platform, target) in &schedule.weekly_targets {
        let count = slots.iter().filter(|s| &s.platform == platform).count();
        info!(platform = %platform, slots = count, target = target.total, "platform quota");
    }
    info!(path = %path.display(), "saved content queue");

    Ok(())
}
