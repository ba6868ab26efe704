//! Synthesis report assembly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Action, ClassifiedItem, Insight, SynthesisOutcome};

/// Insight themes bucketed by recommended action.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PrioritySummary {
    pub fix_now: Vec<String>,
    pub fix_soon: Vec<String>,
    pub roadmap_consider: Vec<String>,
    pub protect: Vec<String>,
    pub monitor: Vec<String>,
}

/// The persisted synthesis report artifact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SynthesisReport {
    pub report_date: String,
    pub generated_at: DateTime<Utc>,
    pub feedback_count: usize,
    pub valid_feedback_count: usize,
    pub sources: BTreeMap<String, usize>,
    pub insights: Vec<Insight>,
    pub patterns_detected: Vec<String>,
    pub category_summary: BTreeMap<String, usize>,
    pub priority_summary: PrioritySummary,
    pub top_priorities: Vec<String>,
    pub raw_feedback: Vec<ClassifiedItem>,
}

/// Assemble the final report from classified items and the synthesis outcome.
///
/// Insights are ordered by action priority, then by evidence count
/// descending. Items skipped by the prefilter or errored during
/// classification count toward `feedback_count` but not
/// `valid_feedback_count`.
#[must_use]
pub fn generate_report(
    classified: &[ClassifiedItem],
    outcome: SynthesisOutcome,
    now: DateTime<Utc>,
) -> SynthesisReport {
    let mut insights = outcome.insights;
    insights.sort_by(|a, b| {
        a.action
            .priority()
            .cmp(&b.action.priority())
            .then(b.evidence_count.cmp(&a.evidence_count))
    });

    let top_priorities = if outcome.top_priorities.is_empty() {
        insights.iter().take(3).map(|i| i.theme.clone()).collect()
    } else {
        outcome.top_priorities
    };

    let valid_feedback_count = classified
        .iter()
        .filter(|i| !i.classification.skipped && i.classification.error.is_none())
        .count();

    let mut sources = BTreeMap::new();
    for item in classified {
        *sources.entry(item.item.source.clone()).or_insert(0) += 1;
    }

    SynthesisReport {
        report_date: now.date_naive().to_string(),
        generated_at: now,
        feedback_count: classified.len(),
        valid_feedback_count,
        sources,
        priority_summary: build_priority_summary(&insights),
        insights,
        patterns_detected: outcome.patterns_detected,
        category_summary: outcome.category_summary,
        top_priorities,
        raw_feedback: classified.to_vec(),
    }
}

fn build_priority_summary(insights: &[Insight]) -> PrioritySummary {
    let mut summary = PrioritySummary::default();
    for insight in insights {
        let bucket = match insight.action {
            Action::FixNow => &mut summary.fix_now,
            Action::FixSoon => &mut summary.fix_soon,
            Action::RoadmapConsider => &mut summary.roadmap_consider,
            Action::Protect => &mut summary.protect,
            Action::Monitor => &mut summary.monitor,
            Action::Unknown => continue,
        };
        bucket.push(insight.theme.clone());
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, FeedbackItem, Intensity, NoiseReason};
    use chrono::TimeZone;

    fn insight(theme: &str, action: Action, evidence: usize) -> Insight {
        Insight {
            theme: theme.to_owned(),
            category: "bug".to_owned(),
            product_area: "general".to_owned(),
            evidence_count: evidence,
            intensity: Intensity::Medium,
            sample_quotes: Vec::new(),
            user_ids: Vec::new(),
            product_implication: None,
            action,
            confidence: 0.8,
            weight_bonus: None,
        }
    }

    fn classified(source: &str, skipped: bool, error: Option<&str>) -> ClassifiedItem {
        ClassifiedItem {
            item: FeedbackItem {
                id: "fb-1".to_owned(),
                source: source.to_owned(),
                user_id: "u1".to_owned(),
                user_type: None,
                timestamp: Utc::now(),
                content: "content".to_owned(),
                context: None,
            },
            classification: Classification {
                category: if skipped { "noise".to_owned() } else { "bug".to_owned() },
                skipped,
                skip_reason: skipped.then_some(NoiseReason::TooShort),
                error: error.map(str::to_owned),
                ..Classification::default()
            },
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
    }

    #[test]
    fn insights_sort_by_action_then_evidence() {
        let outcome = SynthesisOutcome {
            insights: vec![
                insight("watch this", Action::Monitor, 10),
                insight("small fire", Action::FixNow, 2),
                insight("big fire", Action::FixNow, 7),
                insight("mystery", Action::Unknown, 99),
            ],
            ..SynthesisOutcome::default()
        };

        let report = generate_report(&[], outcome, fixed_now());
        let themes: Vec<&str> = report.insights.iter().map(|i| i.theme.as_str()).collect();
        assert_eq!(themes, vec!["big fire", "small fire", "watch this", "mystery"]);

        assert_eq!(report.priority_summary.fix_now, vec!["big fire", "small fire"]);
        assert_eq!(report.priority_summary.monitor, vec!["watch this"]);
    }

    #[test]
    fn top_priorities_default_to_first_three_themes() {
        let outcome = SynthesisOutcome {
            insights: vec![
                insight("a", Action::FixNow, 5),
                insight("b", Action::FixSoon, 4),
                insight("c", Action::Protect, 3),
                insight("d", Action::Monitor, 2),
            ],
            ..SynthesisOutcome::default()
        };

        let report = generate_report(&[], outcome, fixed_now());
        assert_eq!(report.top_priorities, vec!["a", "b", "c"]);
    }

    #[test]
    fn provided_top_priorities_are_kept() {
        let outcome = SynthesisOutcome {
            insights: vec![insight("a", Action::Monitor, 1)],
            top_priorities: vec!["model says this first".to_owned()],
            ..SynthesisOutcome::default()
        };

        let report = generate_report(&[], outcome, fixed_now());
        assert_eq!(report.top_priorities, vec!["model says this first"]);
    }

    #[test]
    fn counts_and_sources_reflect_input() {
        let classified = vec![
            classified("dm-conversation", false, None),
            classified("dm-conversation", true, None),
            classified("manual", false, Some("timeout")),
        ];

        let report = generate_report(&classified, SynthesisOutcome::default(), fixed_now());
        assert_eq!(report.report_date, "2026-08-24");
        assert_eq!(report.feedback_count, 3);
        assert_eq!(report.valid_feedback_count, 1);
        assert_eq!(report.sources["dm-conversation"], 2);
        assert_eq!(report.sources["manual"], 1);
        assert_eq!(report.raw_feedback.len(), 3);
    }
}
