//! Weekly aggregation over analyzed posts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use growloop_core::PipelineConfig;
use tracing::debug;

use crate::engagement::{classify_engagement, engagement_rate, save_rate, time_slot};
use crate::types::{
    Aggregations, AnalyzedPost, Derived, GroupStats, MetricsArtifact, PerformerRef, Performers,
    PostMetrics, WeeklyMetrics,
};

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Attach derived metrics to every post.
#[must_use]
pub fn analyze_posts(posts: Vec<PostMetrics>, config: &PipelineConfig) -> Vec<AnalyzedPost> {
    posts
        .into_iter()
        .map(|post| {
            let rate = engagement_rate(&post, &config.platforms);
            let reach = config
                .platforms
                .get(&post.platform)
                .map_or_else(|| post.counter("reach"), |p| post.counter(&p.reach_field));
            let calculated = Derived {
                engagement_rate: rate,
                save_rate: save_rate(&post),
                time_slot: time_slot(post.posted_at.as_deref(), &config.time_slots),
                engagement_class: classify_engagement(rate, &config.engagement),
                reach,
            };
            debug!(
                content_id = %post.content_id,
                engagement_rate = rate,
                slot = %calculated.time_slot,
                "analyzed post"
            );
            AnalyzedPost { post, calculated }
        })
        .collect()
}

/// Group posts by a dimension and average their engagement rates.
///
/// Posts whose key is absent or empty are skipped.
pub fn aggregate_by<F>(posts: &[AnalyzedPost], key_fn: F) -> BTreeMap<String, GroupStats>
where
    F: Fn(&AnalyzedPost) -> Option<String>,
{
    let mut sums: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();
    for post in posts {
        let Some(key) = key_fn(post).filter(|k| !k.is_empty()) else {
            continue;
        };
        let entry = sums.entry(key).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += post.calculated.engagement_rate;
        entry.2 += post.calculated.reach;
    }

    sums.into_iter()
        .map(|(key, (count, total_engagement, total_reach))| {
            #[allow(clippy::cast_precision_loss)]
            let avg = round4(total_engagement / count as f64);
            (
                key,
                GroupStats {
                    count,
                    avg_engagement: avg,
                    total_reach,
                },
            )
        })
        .collect()
}

/// Top and bottom performers by engagement rate.
///
/// Both lists are literal slices of the same descending sort, so on small
/// inputs a post may appear in both.
#[must_use]
pub fn find_performers(posts: &[AnalyzedPost], top_n: usize, bottom_m: usize) -> Performers {
    let mut sorted: Vec<&AnalyzedPost> = posts.iter().collect();
    sorted.sort_by(|a, b| {
        b.calculated
            .engagement_rate
            .partial_cmp(&a.calculated.engagement_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let to_ref = |post: &&AnalyzedPost| PerformerRef {
        content_id: post.post.content_id.clone(),
        platform: post.post.platform.clone(),
        content_type: post.post.content_type.clone(),
        pillar: post.post.pillar.clone(),
        engagement: round4(post.calculated.engagement_rate),
        reach: post.calculated.reach,
        notes: post.post.notes.clone().unwrap_or_default(),
    };

    let bottom_start = sorted.len().saturating_sub(bottom_m);
    Performers {
        top: sorted.iter().take(top_n).map(to_ref).collect(),
        bottom: sorted[bottom_start..].iter().map(to_ref).collect(),
    }
}

/// Assemble the persisted weekly metrics artifact.
#[must_use]
pub fn build_metrics_artifact(
    input: &WeeklyMetrics,
    config: &PipelineConfig,
    now: DateTime<Utc>,
) -> MetricsArtifact {
    let posts = analyze_posts(input.posts.clone(), config);
    let aggregations = Aggregations {
        by_platform: aggregate_by(&posts, |p| Some(p.post.platform.clone())),
        by_content_type: aggregate_by(&posts, |p| Some(p.post.content_type.clone())),
        by_pillar: aggregate_by(&posts, |p| p.post.pillar.clone()),
        by_posting_time: aggregate_by(&posts, |p| Some(p.calculated.time_slot.clone())),
    };
    let performers = find_performers(
        &posts,
        config.insights.top_performers_count,
        config.insights.underperformers_count,
    );

    MetricsArtifact {
        week_of: input.week_of.clone(),
        analyzed_at: now,
        follower_changes: input.follower_changes.clone(),
        total_posts: posts.len(),
        aggregations,
        performers,
        posts,
    }
}
