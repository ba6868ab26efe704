//! Per-candidate scoring rules.

use chrono::{DateTime, Utc};
use growloop_core::{ScoringConfig, TierBreakpoints};

use crate::types::{ActivityLevel, Candidate, Score, ScoreBreakdown, Tier};

const SECS_PER_DAY: i64 = 86_400;

/// Score one candidate against the configured rule weights.
///
/// A candidate with no attached analysis scores zero everywhere; scoring
/// never fails.
#[must_use]
pub fn score_prospect(candidate: &Candidate, config: &ScoringConfig, now: DateTime<Utc>) -> Score {
    let weights = &config.weights;
    let mut breakdown = ScoreBreakdown::default();

    if let Some(analysis) = &candidate.analysis {
        if analysis.has_prospect_signals && !analysis.signals.is_empty() {
            breakdown.high_intent = weights.high_intent_signal;
        }
        if analysis.signals.len() > 1 {
            breakdown.multiple_signals = weights.multiple_signals;
        }

        let age_days = age_in_days(candidate.created_utc, now);
        if age_days <= 7 {
            breakdown.recency = weights.active_last_week;
        } else if age_days <= 30 {
            breakdown.recency = weights.active_last_month;
        }

        if candidate.score >= config.engagement_min_score
            || candidate.num_comments >= config.engagement_min_comments
        {
            breakdown.engagement = weights.high_engagement;
        }

        if analysis.is_creator {
            breakdown.is_creator = weights.is_creator;
        }
    }

    Score {
        total: breakdown.sum(),
        breakdown,
    }
}

/// Map a total score onto its outreach tier.
#[must_use]
pub fn assign_tier(total: u32, tiers: &TierBreakpoints) -> Tier {
    if total >= tiers.immediate {
        Tier::Immediate
    } else if total >= tiers.batch {
        Tier::Batch
    } else {
        Tier::Watchlist
    }
}

/// Judge author activity from the post age alone.
#[must_use]
pub fn activity_level(created_utc: i64, now: DateTime<Utc>) -> ActivityLevel {
    let age_days = age_in_days(created_utc, now);
    if age_days <= 1 {
        ActivityLevel::Daily
    } else if age_days <= 7 {
        ActivityLevel::Weekly
    } else {
        ActivityLevel::Monthly
    }
}

/// Whole days elapsed since `created_utc`. A timestamp in the future counts
/// as zero days old.
fn age_in_days(created_utc: i64, now: DateTime<Utc>) -> i64 {
    (now.timestamp() - created_utc).max(0) / SECS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Analysis, Signal};
    use chrono::TimeZone;

    fn signal(kind: &str) -> Signal {
        Signal {
            signal_type: kind.to_owned(),
            quote: "looking for something like this".to_owned(),
            confidence: 0.9,
        }
    }

    fn candidate(days_old: i64, score: i64, comments: u64, analysis: Option<Analysis>) -> Candidate {
        let now = fixed_now();
        Candidate {
            id: "t3_abc".to_owned(),
            author: Some("alice".to_owned()),
            platform: "reddit".to_owned(),
            title: Some("any title".to_owned()),
            created_utc: now.timestamp() - days_old * SECS_PER_DAY,
            score,
            num_comments: comments,
            permalink: None,
            analysis,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
    }

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn two_signals_recent_and_engaged_scores_eight() {
        let analysis = Analysis {
            has_prospect_signals: true,
            signals: vec![signal("seeking_recommendations"), signal("frustration")],
            ..Analysis::default()
        };
        let score = score_prospect(&candidate(3, 150, 5, Some(analysis)), &config(), fixed_now());

        assert_eq!(score.breakdown.high_intent, 3);
        assert_eq!(score.breakdown.multiple_signals, 2);
        assert_eq!(score.breakdown.recency, 2);
        assert_eq!(score.breakdown.engagement, 1);
        assert_eq!(score.breakdown.is_creator, 0);
        assert_eq!(score.total, 8);
        assert_eq!(assign_tier(score.total, &config().tiers), Tier::Immediate);
    }

    #[test]
    fn single_stale_signal_scores_four() {
        let analysis = Analysis {
            has_prospect_signals: true,
            signals: vec![signal("frustration")],
            ..Analysis::default()
        };
        let score = score_prospect(&candidate(20, 10, 2, Some(analysis)), &config(), fixed_now());

        assert_eq!(score.breakdown.high_intent, 3);
        assert_eq!(score.breakdown.multiple_signals, 0);
        assert_eq!(score.breakdown.recency, 1);
        assert_eq!(score.breakdown.engagement, 0);
        assert_eq!(score.total, 4);
        assert_eq!(assign_tier(score.total, &config().tiers), Tier::Watchlist);
    }

    #[test]
    fn no_analysis_scores_zero() {
        let score = score_prospect(&candidate(1, 500, 100, None), &config(), fixed_now());
        assert_eq!(score.total, 0);
        assert_eq!(score.breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn flagged_but_empty_signal_list_earns_no_intent_points() {
        let analysis = Analysis {
            has_prospect_signals: true,
            ..Analysis::default()
        };
        let score = score_prospect(&candidate(40, 0, 0, Some(analysis)), &config(), fixed_now());
        assert_eq!(score.breakdown.high_intent, 0);
        assert_eq!(score.breakdown.multiple_signals, 0);
    }

    #[test]
    fn total_always_equals_breakdown_sum() {
        let cases = [
            candidate(0, 0, 0, None),
            candidate(
                2,
                150,
                30,
                Some(Analysis {
                    has_prospect_signals: true,
                    signals: vec![signal("a"), signal("b"), signal("c")],
                    is_creator: true,
                    ..Analysis::default()
                }),
            ),
            candidate(
                9,
                99,
                24,
                Some(Analysis {
                    has_prospect_signals: true,
                    signals: vec![signal("a")],
                    ..Analysis::default()
                }),
            ),
        ];
        for case in &cases {
            let score = score_prospect(case, &config(), fixed_now());
            assert_eq!(score.total, score.breakdown.sum());
        }
    }

    #[test]
    fn engagement_triggers_on_either_metric() {
        let analysis = Analysis {
            has_prospect_signals: true,
            signals: vec![signal("a")],
            ..Analysis::default()
        };
        let by_score =
            score_prospect(&candidate(2, 100, 0, Some(analysis.clone())), &config(), fixed_now());
        let by_comments =
            score_prospect(&candidate(2, 0, 25, Some(analysis)), &config(), fixed_now());
        assert_eq!(by_score.breakdown.engagement, 1);
        assert_eq!(by_comments.breakdown.engagement, 1);
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        let now = fixed_now();
        let mut c = candidate(0, 0, 0, None);
        c.created_utc = now.timestamp() + SECS_PER_DAY;
        assert_eq!(activity_level(c.created_utc, now), ActivityLevel::Daily);
    }

    #[test]
    fn activity_level_bands() {
        let now = fixed_now();
        let at = |days: i64| now.timestamp() - days * SECS_PER_DAY;
        assert_eq!(activity_level(at(0), now), ActivityLevel::Daily);
        assert_eq!(activity_level(at(1), now), ActivityLevel::Daily);
        assert_eq!(activity_level(at(5), now), ActivityLevel::Weekly);
        assert_eq!(activity_level(at(8), now), ActivityLevel::Monthly);
    }

    #[test]
    fn tier_breakpoints_are_inclusive() {
        let tiers = config().tiers;
        assert_eq!(assign_tier(8, &tiers), Tier::Immediate);
        assert_eq!(assign_tier(7, &tiers), Tier::Batch);
        assert_eq!(assign_tier(5, &tiers), Tier::Batch);
        assert_eq!(assign_tier(4, &tiers), Tier::Watchlist);
    }
}
