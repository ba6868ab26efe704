//! Weekly metrics input and derived analysis shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One published post with its raw platform counters.
///
/// Counter fields (likes, views, saves, ...) differ per platform, so they are
/// kept as a flattened map and read through the configured field names.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostMetrics {
    pub content_id: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub pillar: Option<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub counters: BTreeMap<String, Value>,
}

impl PostMetrics {
    /// Read a raw counter by field name; missing or non-numeric reads as 0.
    #[must_use]
    pub fn counter(&self, field: &str) -> f64 {
        self.counters.get(field).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

/// The operator-entered weekly metrics file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeeklyMetrics {
    pub week_of: String,
    #[serde(default)]
    pub follower_changes: Value,
    pub posts: Vec<PostMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementClass {
    Excellent,
    Good,
    Average,
    Poor,
    VeryPoor,
}

/// Metrics derived per post during analysis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Derived {
    pub engagement_rate: f64,
    /// Instagram only; `None` on other platforms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_rate: Option<f64>,
    pub time_slot: String,
    pub engagement_class: EngagementClass,
    pub reach: f64,
}

/// A post with its derived metrics attached.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzedPost {
    #[serde(flatten)]
    pub post: PostMetrics,
    pub calculated: Derived,
}

/// Per-group aggregation stats. `avg_engagement` is rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub avg_engagement: f64,
    pub total_reach: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Aggregations {
    pub by_platform: BTreeMap<String, GroupStats>,
    pub by_content_type: BTreeMap<String, GroupStats>,
    pub by_pillar: BTreeMap<String, GroupStats>,
    pub by_posting_time: BTreeMap<String, GroupStats>,
}

/// Condensed reference to one post inside the performer lists.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerformerRef {
    pub content_id: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub pillar: Option<String>,
    pub engagement: f64,
    pub reach: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Performers {
    pub top: Vec<PerformerRef>,
    pub bottom: Vec<PerformerRef>,
}

/// The persisted weekly metrics artifact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsArtifact {
    pub week_of: String,
    pub analyzed_at: DateTime<Utc>,
    pub follower_changes: Value,
    pub total_posts: usize,
    pub aggregations: Aggregations,
    pub performers: Performers,
    pub posts: Vec<AnalyzedPost>,
}

/// Model-suggested adjustments for next week, straight from the insights
/// artifact.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NextWeekAdjustments {
    pub content_mix: MixAdjustments,
    pub pillars: PillarAdjustments,
    pub timing: TimingAdjustments,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MixAdjustments {
    pub increase: Vec<String>,
    pub decrease: Vec<String>,
    pub test: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PillarAdjustments {
    pub focus: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingAdjustments {
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TopPerformerAnalysis {
    pub best_hooks: Vec<String>,
    pub sound_impact: Option<String>,
}

/// The weekly insights artifact: the metrics plus whatever analysis keys the
/// model produced. Unknown keys are preserved through `extra`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightsReport {
    pub week_of: String,
    pub aggregations: Aggregations,
    pub performers: Performers,
    pub next_week_adjustments: Option<NextWeekAdjustments>,
    pub top_performer_analysis: Option<TopPerformerAnalysis>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
