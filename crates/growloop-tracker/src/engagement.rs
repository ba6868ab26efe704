//! Per-post derived metrics.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike};
use growloop_core::{EngagementThresholds, HourRange, PlatformMetrics};

use crate::types::{EngagementClass, PostMetrics};

/// Engagement rate: sum of the platform's interaction fields over its reach
/// field. 0 when the denominator is 0 or the platform is not configured.
#[must_use]
pub fn engagement_rate(post: &PostMetrics, platforms: &BTreeMap<String, PlatformMetrics>) -> f64 {
    let Some(platform) = platforms.get(&post.platform) else {
        return 0.0;
    };

    let reach = post.counter(&platform.reach_field);
    if reach == 0.0 {
        return 0.0;
    }

    let interactions: f64 = platform
        .engagement_fields
        .iter()
        .map(|field| post.counter(field))
        .sum();
    interactions / reach
}

/// Save rate, an Instagram-only signal: saves over reach.
#[must_use]
pub fn save_rate(post: &PostMetrics) -> Option<f64> {
    if post.platform != "instagram" {
        return None;
    }
    let reach = post.counter("reach");
    if reach == 0.0 {
        return Some(0.0);
    }
    Some(post.counter("saves") / reach)
}

/// Name the configured time slot the post went out in, by the hour of its
/// own timezone. Unparseable or missing timestamps land in `unknown`.
#[must_use]
pub fn time_slot(posted_at: Option<&str>, slots: &BTreeMap<String, HourRange>) -> String {
    let Some(hour) = posted_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.hour())
    else {
        return "unknown".to_owned();
    };

    slots
        .iter()
        .find(|(_, range)| hour >= range.start && hour < range.end)
        .map_or_else(|| "unknown".to_owned(), |(name, _)| name.clone())
}

#[must_use]
pub fn classify_engagement(rate: f64, thresholds: &EngagementThresholds) -> EngagementClass {
    if rate >= thresholds.excellent {
        EngagementClass::Excellent
    } else if rate >= thresholds.good {
        EngagementClass::Good
    } else if rate >= thresholds.average {
        EngagementClass::Average
    } else if rate >= thresholds.poor {
        EngagementClass::Poor
    } else {
        EngagementClass::VeryPoor
    }
}
