//! Feedback items, classifications and synthesized insights.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of user-originated text, before classification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackItem {
    pub id: String,
    pub source: String,
    pub user_id: String,
    #[serde(default)]
    pub user_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Why an item was rejected before reaching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseReason {
    TooShort,
    VagueResponse,
}

impl std::fmt::Display for NoiseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TooShort => "too-short",
            Self::VagueResponse => "vague-response",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Model (or synthetic) classification of a feedback item.
///
/// Exactly one of three shapes in practice: a real classification, a
/// `skipped` noise marker from the prefilter, or an `error` marker when the
/// model call failed. Never mutated after assignment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Classification {
    pub category: String,
    pub subcategory: Option<String>,
    pub product_area: Option<String>,
    pub intensity: Option<Intensity>,
    pub is_specific: bool,
    pub is_actionable: bool,
    pub noise_score: f64,
    pub extracted_insight: Option<String>,
    pub key_quote: Option<String>,
    pub pattern_type: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub skipped: bool,
    pub skip_reason: Option<NoiseReason>,
    pub error: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Classification {
    /// A classification usable for clustering: not prefiltered, not errored,
    /// not categorized as noise.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.skipped && self.error.is_none() && self.category != "noise"
    }
}

/// A feedback item with its classification attached.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifiedItem {
    #[serde(flatten)]
    pub item: FeedbackItem,
    pub classification: Classification,
}

/// Recommended action for an insight, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    FixNow,
    FixSoon,
    RoadmapConsider,
    Protect,
    Monitor,
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Sort key: lower sorts first in reports.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::FixNow => 0,
            Self::FixSoon => 1,
            Self::RoadmapConsider => 2,
            Self::Protect => 3,
            Self::Monitor => 4,
            Self::Unknown => 5,
        }
    }
}

/// An aggregated cluster of feedback sharing product area and category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Insight {
    pub theme: String,
    pub category: String,
    pub product_area: String,
    pub evidence_count: usize,
    pub intensity: Intensity,
    #[serde(default)]
    pub sample_quotes: Vec<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub product_implication: Option<String>,
    pub action: Action,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_bonus: Option<f64>,
}

/// The clusterer's output, before report assembly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthesisOutcome {
    pub insights: Vec<Insight>,
    pub patterns_detected: Vec<String>,
    pub category_summary: BTreeMap<String, usize>,
    pub top_priorities: Vec<String>,
}
