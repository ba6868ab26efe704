//! Feedback routing: turn the weekly insights into context files for the
//! content generator and the trend scout.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GroupStats, InsightsReport, PerformerRef};

/// Context handed to the content generator for next week's prompts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentFeedback {
    pub generated_at: DateTime<Utc>,
    pub week_of: String,
    pub performance_context: PerformanceContext,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceContext {
    pub top_formats: Vec<String>,
    pub top_pillars: Vec<String>,
    pub avoid: Vec<String>,
    pub best_hooks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Recommendations {
    pub increase: Vec<String>,
    pub decrease: Vec<String>,
    pub test: Vec<String>,
    pub focus_pillars: Vec<String>,
    pub timing_notes: String,
}

/// Context handed to the trend scout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoutFeedback {
    pub generated_at: DateTime<Utc>,
    pub week_of: String,
    pub validated_trends: Vec<String>,
    pub underperforming_trends: Vec<String>,
    pub request: String,
}

/// Group names ranked by average engagement, descending. Ties keep the
/// alphabetical map order.
fn ranked_by_engagement(groups: &BTreeMap<String, GroupStats>, take: usize) -> Vec<String> {
    let mut entries: Vec<(&String, &GroupStats)> = groups.iter().collect();
    entries.sort_by(|a, b| {
        b.1.avg_engagement
            .partial_cmp(&a.1.avg_engagement)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.into_iter().take(take).map(|(name, _)| name.clone()).collect()
}

/// Build the content-generator context from the weekly insights.
#[must_use]
pub fn content_feedback(report: &InsightsReport, now: DateTime<Utc>) -> ContentFeedback {
    let mut context = PerformanceContext {
        top_formats: ranked_by_engagement(&report.aggregations.by_content_type, 3),
        top_pillars: ranked_by_engagement(&report.aggregations.by_pillar, 2),
        ..PerformanceContext::default()
    };

    let adjustments = report.next_week_adjustments.clone().unwrap_or_default();
    context.avoid = adjustments.content_mix.decrease.clone();

    if let Some(analysis) = &report.top_performer_analysis {
        context.best_hooks = analysis.best_hooks.clone();
        context.sound_notes = analysis.sound_impact.clone();
    }

    ContentFeedback {
        generated_at: now,
        week_of: report.week_of.clone(),
        performance_context: context,
        recommendations: Recommendations {
            increase: adjustments.content_mix.increase,
            decrease: adjustments.content_mix.decrease,
            test: adjustments.content_mix.test,
            focus_pillars: adjustments.pillars.focus,
            timing_notes: adjustments.timing.notes,
        },
    }
}

fn distinct_labels(performers: &[PerformerRef]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut push = |label: Option<&String>| {
        if let Some(label) = label {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    };
    for p in performers {
        push(Some(&p.content_type));
    }
    for p in performers {
        push(p.pillar.as_ref());
    }
    labels
}

/// Build the scout context from the weekly insights.
///
/// A format or pillar appearing among both top and bottom performers stays
/// validated; exclusion only removes it from the underperforming list.
#[must_use]
pub fn scout_feedback(report: &InsightsReport, now: DateTime<Utc>) -> ScoutFeedback {
    let validated_trends = distinct_labels(&report.performers.top);
    let underperforming_trends: Vec<String> = distinct_labels(&report.performers.bottom)
        .into_iter()
        .filter(|label| !validated_trends.contains(label))
        .collect();

    let request = report.performers.top.first().map_or_else(String::new, |best| {
        format!(
            "Find more content similar to {} content with {} pillar",
            best.content_type,
            best.pillar.as_deref().unwrap_or("unknown")
        )
    });

    ScoutFeedback {
        generated_at: now,
        week_of: report.week_of.clone(),
        validated_trends,
        underperforming_trends,
        request,
    }
}
