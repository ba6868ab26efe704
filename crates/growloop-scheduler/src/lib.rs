//! Weekly content slot scheduling.
//!
//! Slot generation is fully deterministic from the schedule configuration;
//! the only permitted nondeterminism is the trend shuffle in
//! [`assign_trends`].

use growloop_core::{ScheduleConfig, DAYS};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One planned posting slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Slot {
    pub day: String,
    /// Position within that day for the platform, original slots first.
    pub slot_index: u32,
    pub platform: String,
    pub content_type: String,
    pub is_repost: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Value>,
}

/// Per-platform countdown over the configured content-mix buckets.
struct QuotaBuckets {
    buckets: Vec<(String, u32)>,
    fallback: String,
}

impl QuotaBuckets {
    fn new(config: &ScheduleConfig, platform: &str) -> Self {
        let buckets = config
            .content_mix
            .get(platform)
            .map(|mix| {
                mix.iter()
                    .map(|bucket| (bucket.content_type.clone(), bucket.count))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            buckets,
            fallback: config.default_content_type.clone(),
        }
    }

    /// Drain the first non-empty bucket; fall back once all are exhausted.
    fn next_type(&mut self) -> String {
        for (content_type, remaining) in &mut self.buckets {
            if *remaining > 0 {
                *remaining -= 1;
                return content_type.clone();
            }
        }
        self.fallback.clone()
    }
}

/// Generate the week's original slots from the daily breakdown.
///
/// Days run Monday through Sunday; platforms within a day in name order.
#[must_use]
pub fn generate_weekly_slots(config: &ScheduleConfig) -> Vec<Slot> {
    let mut quotas: Vec<(String, QuotaBuckets)> = config
        .weekly_targets
        .keys()
        .map(|platform| (platform.clone(), QuotaBuckets::new(config, platform)))
        .collect();

    let mut slots = Vec::new();
    for day in DAYS {
        let Some(counts) = config.daily_breakdown.get(day) else {
            continue;
        };
        for (platform, quota) in &mut quotas {
            let count = counts.get(platform.as_str()).copied().unwrap_or(0);
            for index in 0..count {
                slots.push(Slot {
                    day: day.to_owned(),
                    slot_index: index,
                    platform: platform.clone(),
                    content_type: quota.next_type(),
                    is_repost: false,
                    trend: None,
                });
            }
        }
    }

    debug!(count = slots.len(), "generated original slots");
    slots
}

/// Generate repost slots from each platform's candidate day list.
///
/// Capped at min(repost target, candidate days), so a short candidate list
/// yields fewer reposts rather than doubling up days.
#[must_use]
pub fn generate_repost_slots(config: &ScheduleConfig) -> Vec<Slot> {
    let mut slots = Vec::new();
    for (platform, target) in &config.weekly_targets {
        let candidates = config.repost_days.get(platform).cloned().unwrap_or_default();
        let target_repost = usize::try_from(target.repost).unwrap_or(usize::MAX);
        let take = target_repost.min(candidates.len());

        for day in candidates.into_iter().take(take) {
            // Reposts slot in after that day's original slots.
            let originals = config
                .daily_breakdown
                .get(&day)
                .and_then(|counts| counts.get(platform))
                .copied()
                .unwrap_or(0);
            slots.push(Slot {
                day,
                slot_index: originals,
                platform: platform.clone(),
                content_type: config.default_content_type.clone(),
                is_repost: true,
                trend: None,
            });
        }
    }

    debug!(count = slots.len(), "generated repost slots");
    slots
}

/// Assign trends cyclically to original slots, in shuffled order.
///
/// Never changes slot count, type or repost flag. Repost slots get no trend.
pub fn assign_trends<R: Rng + ?Sized>(slots: &mut [Slot], trends: &[Value], rng: &mut R) {
    if trends.is_empty() {
        return;
    }

    let mut shuffled: Vec<&Value> = trends.iter().collect();
    shuffled.shuffle(rng);

    let mut next = 0;
    for slot in slots.iter_mut().filter(|s| !s.is_repost) {
        slot.trend = Some(shuffled[next % shuffled.len()].clone());
        next += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn config() -> ScheduleConfig {
        ScheduleConfig::default()
    }

    fn count_platform<'a>(slots: impl IntoIterator<Item = &'a Slot>, platform: &str) -> usize {
        slots.into_iter().filter(|s| s.platform == platform).count()
    }

    #[test]
    fn original_slots_match_daily_breakdown() {
        let slots = generate_weekly_slots(&config());

        assert_eq!(count_platform(&slots, "tiktok"), 5);
        assert_eq!(count_platform(&slots, "instagram"), 3);
        assert_eq!(count_platform(&slots, "threads"), 2);
        assert!(slots.iter().all(|s| !s.is_repost));
    }

    #[test]
    fn content_types_drain_quota_buckets_in_order() {
        let slots = generate_weekly_slots(&config());
        let tiktok_types: Vec<&str> = slots
            .iter()
            .filter(|s| s.platform == "tiktok")
            .map(|s| s.content_type.as_str())
            .collect();

        // Mix is video x3 then static x2.
        assert_eq!(tiktok_types, vec!["video", "video", "video", "static", "static"]);
    }

    #[test]
    fn exhausted_buckets_fall_back_to_default_type() {
        let mut cfg = config();
        cfg.content_mix.get_mut("tiktok").unwrap().truncate(1); // video x3 only

        let slots = generate_weekly_slots(&cfg);
        let tiktok_types: Vec<&str> = slots
            .iter()
            .filter(|s| s.platform == "tiktok")
            .map(|s| s.content_type.as_str())
            .collect();
        assert_eq!(tiktok_types, vec!["video", "video", "video", "video", "video"]);
    }

    #[test]
    fn weekly_totals_hold_for_every_platform() {
        let cfg = config();
        let mut slots = generate_weekly_slots(&cfg);
        slots.extend(generate_repost_slots(&cfg));

        for (platform, target) in &cfg.weekly_targets {
            assert_eq!(
                count_platform(&slots, platform),
                usize::try_from(target.total).unwrap(),
                "platform {platform}"
            );
        }
    }

    #[test]
    fn tiktok_week_is_nine_slots_four_reposts() {
        let cfg = config();
        let original = generate_weekly_slots(&cfg);
        let reposts = generate_repost_slots(&cfg);

        let tiktok_original = count_platform(&original, "tiktok");
        let tiktok_repost = count_platform(&reposts, "tiktok");
        assert_eq!(tiktok_original + tiktok_repost, 9);
        assert_eq!(tiktok_repost, 4);
        assert!(reposts.iter().all(|s| s.is_repost));
    }

    #[test]
    fn short_candidate_list_caps_reposts() {
        let mut cfg = config();
        cfg.repost_days
            .insert("tiktok".to_owned(), vec!["tuesday".to_owned(), "thursday".to_owned()]);

        let reposts = generate_repost_slots(&cfg);
        assert_eq!(count_platform(&reposts, "tiktok"), 2);
    }

    #[test]
    fn trends_cover_all_original_slots_cyclically() {
        let cfg = config();
        let mut slots = generate_weekly_slots(&cfg);
        slots.extend(generate_repost_slots(&cfg));
        let before: Vec<(String, String, bool)> = slots
            .iter()
            .map(|s| (s.platform.clone(), s.content_type.clone(), s.is_repost))
            .collect();

        let trends = vec![json!({"name": "sound-a"}), json!({"name": "sound-b"})];
        let mut rng = StdRng::seed_from_u64(7);
        assign_trends(&mut slots, &trends, &mut rng);

        let after: Vec<(String, String, bool)> = slots
            .iter()
            .map(|s| (s.platform.clone(), s.content_type.clone(), s.is_repost))
            .collect();
        assert_eq!(before, after);

        assert!(slots.iter().filter(|s| !s.is_repost).all(|s| s.trend.is_some()));
        assert!(slots.iter().filter(|s| s.is_repost).all(|s| s.trend.is_none()));
    }

    #[test]
    fn no_trends_leaves_slots_untouched() {
        let mut slots = generate_weekly_slots(&config());
        let mut rng = StdRng::seed_from_u64(7);
        assign_trends(&mut slots, &[], &mut rng);
        assert!(slots.iter().all(|s| s.trend.is_none()));
    }
}
