//! Candidate and scored-prospect shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw discovery candidate: one social post plus the model analysis that was
/// attached to it upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Post creation time as a unix timestamp in seconds.
    #[serde(default)]
    pub created_utc: i64,
    /// Platform score (upvotes, likes) at collection time.
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

fn default_platform() -> String {
    "reddit".to_owned()
}

/// Model-produced analysis of a candidate post.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Analysis {
    pub has_prospect_signals: bool,
    pub signals: Vec<Signal>,
    pub is_creator: bool,
    pub tropes_mentioned: Vec<String>,
    pub pain_points: Vec<String>,
    pub tone: Option<String>,
    pub hook_angle: Option<String>,
}

/// One detected intent signal inside a candidate's post.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Additive score with its per-rule breakdown. `total` is always the sum of
/// the breakdown fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Score {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    pub high_intent: u32,
    pub multiple_signals: u32,
    pub recency: u32,
    pub engagement: u32,
    pub is_creator: u32,
}

impl ScoreBreakdown {
    #[must_use]
    pub fn sum(&self) -> u32 {
        self.high_intent + self.multiple_signals + self.recency + self.engagement + self.is_creator
    }
}

/// Outreach tier assigned from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Immediate,
    Batch,
    Watchlist,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Immediate => "immediate",
            Self::Batch => "batch",
            Self::Watchlist => "watchlist",
        };
        f.write_str(s)
    }
}

/// How recently the author was active, judged from the post age alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Daily,
    Weekly,
    Monthly,
}

/// A candidate after scoring, before batch formatting.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoredProspect {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub scoring: Score,
    pub priority: Tier,
    pub activity_level: ActivityLevel,
}

/// The persisted outreach batch: what the downstream outreach step consumes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProspectBatch {
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub prospects: Vec<ProspectRecord>,
}

/// One prospect in an outreach batch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProspectRecord {
    /// Stable in-batch id, `prospect-001` onward in score order.
    pub id: String,
    pub handle: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    pub signals: Vec<ProspectSignal>,
    pub context: ProspectContext,
    pub scoring: Score,
    pub priority: Tier,
    pub outreach: Outreach,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProspectSignal {
    #[serde(rename = "type")]
    pub signal_type: String,
    pub quote: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_post: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProspectContext {
    pub tropes_mentioned: Vec<String>,
    pub pain_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Outreach {
    pub recommended_channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_angle: Option<String>,
    pub status: String,
}
