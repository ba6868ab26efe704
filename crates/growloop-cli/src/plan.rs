//! `plan` and `review` commands: the weekly campaign cycle.
//!
//! Both build a JSON context from state plus the latest artifacts, ask the
//! model for a structured document, stamp identity metadata, persist the
//! artifact and fold the result back into campaign state.

use anyhow::Context;
use chrono::Utc;
use growloop_llm::parse_json_response;
use growloop_store::{week_id, week_start, CarryForward, WeekMetrics, WeeklyState};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::context::AppContext;

const PLAN_PROMPT: &str = include_str!("../prompts/plan.md");
const REVIEW_PROMPT: &str = include_str!("../prompts/review.md");

const RECENT_LEARNINGS: usize = 10;
const TOP_INSIGHTS: usize = 5;

pub(crate) async fn run_plan(ctx: &AppContext) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let week = week_id(today);
    let start = week_start(today);

    let mut state = ctx.state.load(now);
    let metrics = ctx
        .artifacts
        .latest("metrics", "metrics")?
        .map_or(Value::Null, |a| a.value);
    let synthesis = ctx
        .artifacts
        .latest("feedback", "synthesis-report")?
        .map(|a| a.value);

    let context = json!({
        "current_date": today.to_string(),
        "week_id": week,
        "week_start": start.to_string(),
        "angle_performance": state.angle_performance,
        "community_performance": state.community_performance,
        "last_week_metrics": metrics,
        "carry_forward": state.carry_forward,
        "recent_learnings": recent_learnings(&state),
        "synthesis_insights": synthesis_context(synthesis.as_ref()),
    });

    let client = ctx.llm_client()?;
    let prompt = PLAN_PROMPT.replace("{{context}}", &serde_json::to_string_pretty(&context)?);
    let text = client.complete(&prompt).await?;
    let mut plan: Value = parse_json_response(&text)?;

    let plan_id = format!("campaign-{week}");
    let object = plan
        .as_object_mut()
        .context("model returned a non-object plan")?;
    object.insert("plan_id".to_owned(), json!(plan_id));
    object.insert("week_of".to_owned(), json!(start.to_string()));
    object.insert("created_at".to_owned(), json!(now));

    let path = ctx.artifacts.save("plans", "campaign", start, &plan)?;
    info!(path = %path.display(), plan_id = %plan["plan_id"], "saved weekly plan");

    state.current_week = Some(week);
    state.last_plan = plan["plan_id"].as_str().map(str::to_owned);
    ctx.state.save(&mut state, now)?;
    info!("updated campaign state");

    Ok(())
}

pub(crate) async fn run_review(ctx: &AppContext) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let week = week_id(today);
    let start = week_start(today);

    let mut state = ctx.state.load(now);
    let current_plan = ctx
        .artifacts
        .latest("plans", "campaign")?
        .map_or(Value::Null, |a| a.value);
    let metrics = ctx
        .artifacts
        .latest("metrics", "metrics")?
        .map_or(Value::Null, |a| a.value);
    let synthesis = ctx
        .artifacts
        .latest("feedback", "synthesis-report")?
        .map(|a| a.value);

    let context = json!({
        "current_date": today.to_string(),
        "week_id": week,
        "week_start": start.to_string(),
        "current_plan": current_plan,
        "results": metrics,
        "angle_performance": state.angle_performance,
        "community_performance": state.community_performance,
        "synthesis_insights": synthesis_context(synthesis.as_ref()),
    });

    let client = ctx.llm_client()?;
    let prompt = REVIEW_PROMPT.replace("{{context}}", &serde_json::to_string_pretty(&context)?);
    let text = client.complete(&prompt).await?;
    let mut review: Value = parse_json_response(&text)?;

    let review_id = format!("review-{week}");
    let object = review
        .as_object_mut()
        .context("model returned a non-object review")?;
    object.insert("review_id".to_owned(), json!(review_id));
    object.insert("week_of".to_owned(), json!(start.to_string()));
    object.insert("created_at".to_owned(), json!(now));

    let path = ctx.artifacts.save("reviews", "review", start, &review)?;
    info!(path = %path.display(), review_id = %review["review_id"], "saved weekly review");

    let outcome: ReviewOutcome = serde_json::from_value(review.clone())
        .context("review does not match the expected result shape")?;
    fold_review_into_state(&mut state, &outcome, now);
    state.last_review = review["review_id"].as_str().map(str::to_owned);
    ctx.state.save(&mut state, now)?;
    info!(
        angles = outcome.angle_results.len(),
        communities = outcome.community_results.len(),
        learnings = outcome.learnings.len(),
        "folded review into campaign state"
    );

    Ok(())
}

fn recent_learnings(state: &WeeklyState) -> Vec<&str> {
    let start = state.learnings.len().saturating_sub(RECENT_LEARNINGS);
    state.learnings[start..]
        .iter()
        .map(|l| l.text.as_str())
        .collect()
}

/// Condensed view of the synthesis report for prompting; `Null` when no
/// report exists, which downstream prompts treat as a valid state.
fn synthesis_context(report: Option<&Value>) -> Value {
    let Some(report) = report else {
        return Value::Null;
    };

    let top_insights = report["insights"]
        .as_array()
        .map(|insights| insights.iter().take(TOP_INSIGHTS).cloned().collect())
        .unwrap_or_default();
    json!({
        "feedback_count": report["feedback_count"],
        "priority_items": report["priority_summary"],
        "top_insights": Value::Array(top_insights),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewOutcome {
    angle_results: Vec<AngleResult>,
    community_results: Vec<CommunityResult>,
    learnings: Vec<String>,
    carry_forward: Option<CarryForward>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AngleResult {
    angle_id: String,
    sent: u64,
    replies: u64,
    conversions: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommunityResult {
    community: String,
    sent: u64,
    reply_rate: f64,
    conversions: u64,
}

fn fold_review_into_state(state: &mut WeeklyState, outcome: &ReviewOutcome, now: chrono::DateTime<Utc>) {
    let week = week_start(now.date_naive()).to_string();

    for result in &outcome.angle_results {
        state.update_angle_performance(
            &result.angle_id,
            &WeekMetrics {
                week: week.clone(),
                sent: result.sent,
                replies: result.replies,
                conversions: result.conversions,
            },
        );
    }

    for result in &outcome.community_results {
        // Communities report a rate, not a count; recover the count.
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let replies = (result.reply_rate * result.sent as f64).round().max(0.0) as u64;
        state.update_community_performance(
            &result.community,
            &WeekMetrics {
                week: week.clone(),
                sent: result.sent,
                replies,
                conversions: result.conversions,
            },
        );
    }

    for learning in &outcome.learnings {
        state.add_learning(learning.clone(), now);
    }

    if let Some(carry_forward) = &outcome.carry_forward {
        state.carry_forward = carry_forward.clone();
    }
}
