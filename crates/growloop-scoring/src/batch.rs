//! Batch scoring: score, rank, dedup and format candidates into an outreach
//! batch.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use growloop_core::ScoringConfig;
use uuid::Uuid;

use crate::score::{activity_level, assign_tier, score_prospect};
use crate::types::{
    Candidate, Outreach, ProspectBatch, ProspectContext, ProspectRecord, ProspectSignal,
    ScoredProspect, Tier,
};

const DEFAULT_HOOK_ANGLE: &str = "Personalize based on their post content";

/// Counts of qualified prospects per outreach tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    pub immediate: usize,
    pub batch: usize,
    pub watchlist: usize,
}

/// What happened to a batch of candidates during scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    pub total: usize,
    pub qualified: usize,
    pub below_threshold: usize,
    pub by_tier: TierCounts,
}

/// Score every candidate, sort descending by total and drop those strictly
/// below the configured minimum threshold.
#[must_use]
pub fn score_all(
    candidates: Vec<Candidate>,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> (Vec<ScoredProspect>, ScoreSummary) {
    let total = candidates.len();

    let mut scored: Vec<ScoredProspect> = candidates
        .into_iter()
        .map(|candidate| {
            let scoring = score_prospect(&candidate, config, now);
            let priority = assign_tier(scoring.total, &config.tiers);
            let activity = activity_level(candidate.created_utc, now);
            ScoredProspect {
                candidate,
                scoring,
                priority,
                activity_level: activity,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.scoring.total.cmp(&a.scoring.total));

    let qualified: Vec<ScoredProspect> = scored
        .into_iter()
        .filter(|p| p.scoring.total >= config.min_threshold)
        .collect();

    let mut by_tier = TierCounts::default();
    for prospect in &qualified {
        match prospect.priority {
            Tier::Immediate => by_tier.immediate += 1,
            Tier::Batch => by_tier.batch += 1,
            Tier::Watchlist => by_tier.watchlist += 1,
        }
    }

    let summary = ScoreSummary {
        total,
        qualified: qualified.len(),
        below_threshold: total - qualified.len(),
        by_tier,
    };
    (qualified, summary)
}

/// Collapse prospects that share a handle, keeping the higher-scoring record.
///
/// The identity key is the lowercased handle. An exact score tie keeps the
/// first-seen record; prospects without an author are dropped since they
/// cannot be contacted.
#[must_use]
pub fn dedup_by_handle(prospects: Vec<ScoredProspect>) -> Vec<ScoredProspect> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, ScoredProspect> = HashMap::new();

    for prospect in prospects {
        let Some(author) = &prospect.candidate.author else {
            continue;
        };
        let key = author.to_lowercase();
        match seen.get(&key) {
            None => {
                order.push(key.clone());
                seen.insert(key, prospect);
            }
            Some(existing) => {
                if prospect.scoring.total > existing.scoring.total {
                    seen.insert(key, prospect);
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| seen.remove(&key))
        .collect()
}

/// Render deduplicated prospects into the persisted batch shape.
///
/// `contacted` holds lowercased handles already reached out to; those records
/// get `already_contacted` status instead of `pending`.
#[must_use]
pub fn format_batch(
    prospects: &[ScoredProspect],
    contacted: &BTreeSet<String>,
    generated_at: DateTime<Utc>,
) -> ProspectBatch {
    let records = prospects
        .iter()
        .enumerate()
        .map(|(index, prospect)| format_record(prospect, index, contacted))
        .collect();

    ProspectBatch {
        batch_id: Uuid::new_v4(),
        generated_at,
        prospects: records,
    }
}

fn format_record(
    prospect: &ScoredProspect,
    index: usize,
    contacted: &BTreeSet<String>,
) -> ProspectRecord {
    let candidate = &prospect.candidate;
    let handle = candidate.author.clone().unwrap_or_else(|| "unknown".to_owned());
    let analysis = candidate.analysis.clone().unwrap_or_default();

    let signals = analysis
        .signals
        .iter()
        .map(|s| ProspectSignal {
            signal_type: s.signal_type.clone(),
            quote: s.quote.clone(),
            confidence: s.confidence,
            source_post: candidate.permalink.clone(),
        })
        .collect();

    let status = if contacted.contains(&handle.to_lowercase()) {
        "already_contacted"
    } else {
        "pending"
    };

    ProspectRecord {
        id: format!("prospect-{:03}", index + 1),
        handle: handle.clone(),
        platform: candidate.platform.clone(),
        profile_url: profile_url(&candidate.platform, &handle),
        signals,
        context: ProspectContext {
            tropes_mentioned: analysis.tropes_mentioned,
            pain_points: analysis.pain_points,
            tone: analysis.tone,
            activity_level: prospect.activity_level,
        },
        scoring: prospect.scoring.clone(),
        priority: prospect.priority,
        outreach: Outreach {
            recommended_channel: format!("{}-dm", candidate.platform),
            hook_angle: Some(
                analysis
                    .hook_angle
                    .unwrap_or_else(|| DEFAULT_HOOK_ANGLE.to_owned()),
            ),
            status: status.to_owned(),
        },
    }
}

fn profile_url(platform: &str, handle: &str) -> Option<String> {
    match platform {
        "reddit" => Some(format!("https://reddit.com/u/{handle}")),
        _ => None,
    }
}
