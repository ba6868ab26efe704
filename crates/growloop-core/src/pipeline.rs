//! Pipeline tuning configuration.
//!
//! Everything that shapes scoring, aggregation, and scheduling decisions is
//! declared here with centralized defaults, loaded from one YAML file, and
//! passed explicitly into the pure functions that use it. Components never
//! read tunables from ambient state.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Days of the week in schedule order. Scheduling iterates this slice so slot
/// generation is deterministic regardless of map key order.
pub const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub high_intent_signal: u32,
    pub multiple_signals: u32,
    pub active_last_week: u32,
    pub active_last_month: u32,
    pub high_engagement: u32,
    pub is_creator: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            high_intent_signal: 3,
            multiple_signals: 2,
            active_last_week: 2,
            active_last_month: 1,
            high_engagement: 1,
            is_creator: 1,
        }
    }
}

/// Score breakpoints for priority tiers. A score at or above `immediate`
/// lands in the immediate tier, at or above `batch` in the batch tier,
/// anything else in the watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierBreakpoints {
    pub immediate: u32,
    pub batch: u32,
}

impl Default for TierBreakpoints {
    fn default() -> Self {
        Self {
            immediate: 8,
            batch: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Hard floor: prospects scoring strictly below this are dropped, not
    /// demoted to a lower tier.
    pub min_threshold: u32,
    pub tiers: TierBreakpoints,
    /// A post counts as high-engagement when its raw score reaches this...
    pub engagement_min_score: i64,
    /// ...or its comment count reaches this.
    pub engagement_min_comments: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_threshold: 5,
            tiers: TierBreakpoints::default(),
            engagement_min_score: 100,
            engagement_min_comments: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseWeights {
    pub multiple_occurrences: f64,
    pub high_intensity: f64,
    pub specific_and_actionable: f64,
    pub vague_or_short: f64,
}

impl Default for NoiseWeights {
    fn default() -> Self {
        Self {
            multiple_occurrences: 1.5,
            high_intensity: 1.3,
            specific_and_actionable: 1.2,
            vague_or_short: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Content shorter than this is noise before any classification call.
    pub min_content_length: usize,
    /// Regex sources matched against trimmed content. Compiled by the
    /// feedback crate at startup.
    pub vague_patterns: Vec<String>,
    pub weights: NoiseWeights,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            min_content_length: 10,
            vague_patterns: vec![
                r"(?i)^(its )?(ok|okay|fine|good|nice|cool)\.?$".to_string(),
                r"(?i)^(idk|dunno|maybe|i guess)$".to_string(),
                r"(?i)^(yes|no|yeah|nah|sure)\.?$".to_string(),
            ],
            weights: NoiseWeights::default(),
        }
    }
}

/// Per-platform engagement rate definition: which metric fields are summed
/// for the numerator and which single field is the denominator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub engagement_fields: Vec<String>,
    pub reach_field: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementThresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Default for EngagementThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.08,
            good: 0.05,
            average: 0.03,
            poor: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTarget {
    pub total: u32,
    pub original: u32,
    pub repost: u32,
}

/// One content-type quota bucket. Buckets are drained in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixBucket {
    pub content_type: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weekly_targets: BTreeMap<String, PlatformTarget>,
    /// Original-content slot counts per day name per platform.
    pub daily_breakdown: BTreeMap<String, BTreeMap<String, u32>>,
    /// Content-type quota buckets per platform, in drain priority order.
    pub content_mix: BTreeMap<String, Vec<MixBucket>>,
    /// Candidate days for repost slots per platform, walked in order.
    pub repost_days: BTreeMap<String, Vec<String>>,
    /// Content type used once all quota buckets are exhausted.
    pub default_content_type: String,
    pub max_trends_to_process: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let mut weekly_targets = BTreeMap::new();
        weekly_targets.insert(
            "tiktok".to_string(),
            PlatformTarget {
                total: 9,
                original: 5,
                repost: 4,
            },
        );
        weekly_targets.insert(
            "instagram".to_string(),
            PlatformTarget {
                total: 6,
                original: 3,
                repost: 3,
            },
        );
        weekly_targets.insert(
            "threads".to_string(),
            PlatformTarget {
                total: 3,
                original: 2,
                repost: 1,
            },
        );

        let day = |entries: &[(&str, u32)]| -> BTreeMap<String, u32> {
            entries
                .iter()
                .map(|(p, n)| ((*p).to_string(), *n))
                .collect()
        };

        let mut daily_breakdown = BTreeMap::new();
        daily_breakdown.insert(
            "monday".to_string(),
            day(&[("tiktok", 1), ("instagram", 1), ("threads", 1)]),
        );
        daily_breakdown.insert(
            "wednesday".to_string(),
            day(&[("tiktok", 1), ("instagram", 1), ("threads", 1)]),
        );
        daily_breakdown.insert(
            "friday".to_string(),
            day(&[("tiktok", 2), ("instagram", 1)]),
        );
        daily_breakdown.insert("sunday".to_string(), day(&[("tiktok", 1)]));

        let mix = |entries: &[(&str, u32)]| -> Vec<MixBucket> {
            entries
                .iter()
                .map(|(t, n)| MixBucket {
                    content_type: (*t).to_string(),
                    count: *n,
                })
                .collect()
        };

        let mut content_mix = BTreeMap::new();
        content_mix.insert("tiktok".to_string(), mix(&[("video", 3), ("static", 2)]));
        content_mix.insert(
            "instagram".to_string(),
            mix(&[("video", 1), ("carousel", 1), ("meme", 1)]),
        );
        content_mix.insert("threads".to_string(), mix(&[("text", 2)]));

        let days = |names: &[&str]| -> Vec<String> {
            names.iter().map(|d| (*d).to_string()).collect()
        };

        let mut repost_days = BTreeMap::new();
        repost_days.insert(
            "tiktok".to_string(),
            days(&["tuesday", "thursday", "saturday", "sunday"]),
        );
        repost_days.insert(
            "instagram".to_string(),
            days(&["tuesday", "thursday", "saturday"]),
        );
        repost_days.insert("threads".to_string(), days(&["friday"]));

        Self {
            weekly_targets,
            daily_breakdown,
            content_mix,
            repost_days,
            default_content_type: "video".to_string(),
            max_trends_to_process: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    /// Minimum post count before weekly analysis is considered reliable.
    pub min_posts_for_insight: usize,
    pub top_performers_count: usize,
    pub underperformers_count: usize,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            min_posts_for_insight: 3,
            top_performers_count: 5,
            underperformers_count: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub scoring: ScoringConfig,
    pub noise: NoiseConfig,
    pub platforms: BTreeMap<String, PlatformMetrics>,
    pub time_slots: BTreeMap<String, HourRange>,
    pub engagement: EngagementThresholds,
    pub schedule: ScheduleConfig,
    pub insights: InsightSettings,
}

impl PipelineConfig {
    /// The built-in configuration: default weights plus the standard
    /// platform metric definitions and posting time slots.
    #[must_use]
    pub fn builtin() -> Self {
        let mut platforms = BTreeMap::new();
        platforms.insert(
            "instagram".to_string(),
            PlatformMetrics {
                engagement_fields: vec![
                    "likes".to_string(),
                    "comments".to_string(),
                    "shares".to_string(),
                    "saves".to_string(),
                ],
                reach_field: "reach".to_string(),
            },
        );
        platforms.insert(
            "tiktok".to_string(),
            PlatformMetrics {
                engagement_fields: vec![
                    "likes".to_string(),
                    "comments".to_string(),
                    "shares".to_string(),
                ],
                reach_field: "views".to_string(),
            },
        );
        platforms.insert(
            "threads".to_string(),
            PlatformMetrics {
                engagement_fields: vec![
                    "likes".to_string(),
                    "replies".to_string(),
                    "reposts".to_string(),
                ],
                reach_field: "impressions".to_string(),
            },
        );

        let mut time_slots = BTreeMap::new();
        time_slots.insert("morning".to_string(), HourRange { start: 6, end: 11 });
        time_slots.insert("afternoon".to_string(), HourRange { start: 11, end: 17 });
        time_slots.insert("evening".to_string(), HourRange { start: 17, end: 22 });

        Self {
            platforms,
            time_slots,
            ..Self::default()
        }
    }

    /// Validate cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when weekly targets do not add up,
    /// daily breakdowns disagree with the original-slot target, or repost
    /// day lists cannot satisfy the repost target.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let schedule = &self.schedule;

        for (platform, target) in &schedule.weekly_targets {
            if target.original + target.repost != target.total {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}': original ({}) + repost ({}) != total ({})",
                    target.original, target.repost, target.total
                )));
            }

            let daily_sum: u32 = schedule
                .daily_breakdown
                .values()
                .filter_map(|counts| counts.get(platform))
                .sum();
            if daily_sum != target.original {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}': daily breakdown sums to {daily_sum}, expected {} original slots",
                    target.original
                )));
            }

            let candidate_days = schedule
                .repost_days
                .get(platform)
                .map_or(0, |days| u32::try_from(days.len()).unwrap_or(u32::MAX));
            if candidate_days < target.repost {
                return Err(ConfigError::Validation(format!(
                    "platform '{platform}': {candidate_days} repost candidate days cannot satisfy repost target {}",
                    target.repost
                )));
            }
        }

        for day in schedule.daily_breakdown.keys() {
            if !DAYS.contains(&day.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "unknown day name in daily breakdown: '{day}'"
                )));
            }
        }

        let t = &self.engagement;
        if !(t.excellent > t.good && t.good > t.average && t.average > t.poor) {
            return Err(ConfigError::Validation(
                "engagement thresholds must be strictly decreasing".to_string(),
            ));
        }

        for (name, range) in &self.time_slots {
            if range.start >= range.end {
                return Err(ConfigError::Validation(format!(
                    "time slot '{name}' has empty hour range {}..{}",
                    range.start, range.end
                )));
            }
        }

        Ok(())
    }
}

/// Load and validate the pipeline configuration from a YAML file.
///
/// A missing file is not an error: the built-in defaults are returned so a
/// fresh checkout works without any config. A present-but-invalid file is
/// always an error.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        let config = PipelineConfig::builtin();
        config.validate()?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PipelineFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut config: PipelineConfig = serde_yaml::from_str(&content)?;

    // Platform metric fields and time slots fall back to the builtin set when
    // the file does not mention them, so a partial file stays usable.
    let builtin = PipelineConfig::builtin();
    if config.platforms.is_empty() {
        config.platforms = builtin.platforms;
    }
    if config.time_slots.is_empty() {
        config.time_slots = builtin.time_slots;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        let config = PipelineConfig::builtin();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builtin_targets_add_up() {
        let config = PipelineConfig::builtin();
        for (platform, target) in &config.schedule.weekly_targets {
            assert_eq!(
                target.original + target.repost,
                target.total,
                "platform {platform}"
            );
        }
    }

    #[test]
    fn validate_rejects_mismatched_totals() {
        let mut config = PipelineConfig::builtin();
        config
            .schedule
            .weekly_targets
            .get_mut("tiktok")
            .unwrap()
            .total = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tiktok"));
    }

    #[test]
    fn validate_rejects_daily_breakdown_mismatch() {
        let mut config = PipelineConfig::builtin();
        config
            .schedule
            .daily_breakdown
            .get_mut("monday")
            .unwrap()
            .insert("tiktok".to_string(), 3);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily breakdown"));
    }

    #[test]
    fn validate_rejects_insufficient_repost_days() {
        let mut config = PipelineConfig::builtin();
        config
            .schedule
            .repost_days
            .insert("tiktok".to_string(), vec!["tuesday".to_string()]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("repost candidate days"));
    }

    #[test]
    fn validate_rejects_unknown_day_name() {
        let mut config = PipelineConfig::builtin();
        config
            .schedule
            .daily_breakdown
            .insert("someday".to_string(), BTreeMap::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("someday"));
    }

    #[test]
    fn default_scoring_weights_match_documented_values() {
        let w = ScoringWeights::default();
        assert_eq!(w.high_intent_signal, 3);
        assert_eq!(w.multiple_signals, 2);
        assert_eq!(w.active_last_week, 2);
        assert_eq!(w.active_last_month, 1);
        assert_eq!(w.high_engagement, 1);
        assert_eq!(w.is_creator, 1);
    }

    #[test]
    fn yaml_round_trip_preserves_schedule() {
        let config = PipelineConfig::builtin();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed.schedule.weekly_targets["tiktok"].total,
            config.schedule.weekly_targets["tiktok"].total
        );
        assert_eq!(
            parsed.schedule.default_content_type,
            config.schedule.default_content_type
        );
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let yaml = "scoring:\n  min_threshold: 6\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.scoring.min_threshold, 6);
        assert_eq!(config.scoring.tiers.immediate, 8);
        assert_eq!(config.noise.min_content_length, 10);
    }
}
