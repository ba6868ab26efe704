//! Durable weekly campaign state.
//!
//! One JSON file accumulates angle and community performance across cycles.
//! Totals only ever grow, weekly history entries are append-only, and the
//! learnings list is the single bounded collection (most recent 50 kept).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::artifacts::write_json_atomic;
use crate::StoreError;

/// Maximum retained learnings; oldest entries are evicted first.
pub const MAX_LEARNINGS: usize = 50;

/// Running totals plus per-week history for one angle or community.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub total_sent: u64,
    pub total_replies: u64,
    pub total_conversions: u64,
    pub weekly_data: Vec<WeekRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRecord {
    pub week: String,
    pub sent: u64,
    pub replies: u64,
    pub conversions: u64,
    pub reply_rate: f64,
    pub conversion_rate: f64,
}

/// One week's raw counts, as reported by a review cycle. Missing fields
/// deserialize to zero so a sparse review never produces NaN rates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekMetrics {
    pub week: String,
    pub sent: u64,
    pub replies: u64,
    pub conversions: u64,
}

/// Items explicitly rolled from one cycle's review into the next plan.
/// Replaced wholesale by each review, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryForward {
    pub active_conversations: Vec<Value>,
    pub pending_feedback: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learning {
    pub text: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyState {
    pub current_week: Option<String>,
    pub last_plan: Option<String>,
    pub last_review: Option<String>,
    pub angle_performance: BTreeMap<String, PerformanceEntry>,
    pub community_performance: BTreeMap<String, PerformanceEntry>,
    pub carry_forward: CarryForward,
    pub learnings: Vec<Learning>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for WeeklyState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl WeeklyState {
    /// Zero-valued state stamped with `now`. Used for first runs and as the
    /// recovery value when the state file is corrupt.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_week: None,
            last_plan: None,
            last_review: None,
            angle_performance: BTreeMap::new(),
            community_performance: BTreeMap::new(),
            carry_forward: CarryForward::default(),
            learnings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fold one week of angle results into the running totals and append a
    /// history entry. First reference to an id initializes zeroed totals.
    pub fn update_angle_performance(&mut self, angle_id: &str, metrics: &WeekMetrics) {
        update_entry(
            self.angle_performance
                .entry(angle_id.to_string())
                .or_default(),
            metrics,
        );
    }

    /// Same accumulation as [`update_angle_performance`](Self::update_angle_performance),
    /// keyed by community.
    pub fn update_community_performance(&mut self, community_id: &str, metrics: &WeekMetrics) {
        update_entry(
            self.community_performance
                .entry(community_id.to_string())
                .or_default(),
            metrics,
        );
    }

    /// Append a learning, evicting the oldest entries beyond
    /// [`MAX_LEARNINGS`]. The bound is enforced on every call.
    pub fn add_learning(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.learnings.push(Learning {
            text: text.into(),
            added_at: now,
        });

        if self.learnings.len() > MAX_LEARNINGS {
            let excess = self.learnings.len() - MAX_LEARNINGS;
            self.learnings.drain(..excess);
        }
    }
}

fn update_entry(entry: &mut PerformanceEntry, metrics: &WeekMetrics) {
    entry.total_sent += metrics.sent;
    entry.total_replies += metrics.replies;
    entry.total_conversions += metrics.conversions;

    entry.weekly_data.push(WeekRecord {
        week: metrics.week.clone(),
        sent: metrics.sent,
        replies: metrics.replies,
        conversions: metrics.conversions,
        reply_rate: rate(metrics.replies, metrics.sent),
        conversion_rate: rate(metrics.conversions, metrics.sent),
    });
}

/// Ratio rounded to two decimals; zero denominator yields 0.0, never NaN.
fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let raw = numerator as f64 / denominator as f64;
    (raw * 100.0).round() / 100.0
}

/// Load/save access to the single weekly state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the state file, falling back to a fresh zero state when the file
    /// is missing or corrupt. Never fails: a corrupt file is logged and
    /// replaced by defaults rather than propagated as a crash.
    #[must_use]
    pub fn load(&self, now: DateTime<Utc>) -> WeeklyState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return WeeklyState::new(now),
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "state file corrupt — starting from defaults"
                );
                WeeklyState::new(now)
            }
        }
    }

    /// Persist the state, stamping `updated_at` with `now`. The write is
    /// atomic (temp file + rename) and parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn save(&self, state: &mut WeeklyState, now: DateTime<Utc>) -> Result<(), StoreError> {
        state.updated_at = now;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let value = serde_json::to_value(&*state)?;
        write_json_atomic(&self.path, &value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap()
    }

    fn metrics(week: &str, sent: u64, replies: u64, conversions: u64) -> WeekMetrics {
        WeekMetrics {
            week: week.to_string(),
            sent,
            replies,
            conversions,
        }
    }

    #[test]
    fn update_initializes_entry_on_first_reference() {
        let mut state = WeeklyState::new(now());
        state.update_angle_performance("craft-angle", &metrics("2026-W35", 10, 3, 1));

        let entry = &state.angle_performance["craft-angle"];
        assert_eq!(entry.total_sent, 10);
        assert_eq!(entry.total_replies, 3);
        assert_eq!(entry.total_conversions, 1);
        assert_eq!(entry.weekly_data.len(), 1);
    }

    #[test]
    fn update_accumulates_totals_and_appends_history() {
        let mut state = WeeklyState::new(now());
        state.update_angle_performance("a1", &metrics("2026-W34", 10, 2, 0));
        state.update_angle_performance("a1", &metrics("2026-W35", 5, 3, 2));

        let entry = &state.angle_performance["a1"];
        assert_eq!(entry.total_sent, 15);
        assert_eq!(entry.total_replies, 5);
        assert_eq!(entry.total_conversions, 2);
        assert_eq!(entry.weekly_data.len(), 2);
        // Earlier entries are never edited retroactively.
        assert_eq!(entry.weekly_data[0].week, "2026-W34");
        assert_eq!(entry.weekly_data[0].sent, 10);
    }

    #[test]
    fn week_record_rates_rounded_to_two_decimals() {
        let mut state = WeeklyState::new(now());
        state.update_angle_performance("a1", &metrics("2026-W35", 3, 1, 1));

        let record = &state.angle_performance["a1"].weekly_data[0];
        assert!((record.reply_rate - 0.33).abs() < f64::EPSILON);
        assert!((record.conversion_rate - 0.33).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_sent_yields_zero_rates() {
        let mut state = WeeklyState::new(now());
        state.update_community_performance("c1", &metrics("2026-W35", 0, 0, 0));

        let record = &state.community_performance["c1"].weekly_data[0];
        assert_eq!(record.reply_rate, 0.0);
        assert_eq!(record.conversion_rate, 0.0);
    }

    #[test]
    fn learnings_bounded_to_most_recent_fifty() {
        let mut state = WeeklyState::new(now());
        for i in 0..60 {
            state.add_learning(format!("learning-{i}"), now());
            assert!(state.learnings.len() <= MAX_LEARNINGS);
        }

        assert_eq!(state.learnings.len(), MAX_LEARNINGS);
        // Oldest evicted first: entries 10..60 remain.
        assert_eq!(state.learnings[0].text, "learning-10");
        assert_eq!(state.learnings[49].text, "learning-59");
    }

    #[test]
    fn learnings_below_bound_all_retained() {
        let mut state = WeeklyState::new(now());
        for i in 0..7 {
            state.add_learning(format!("learning-{i}"), now());
        }
        assert_eq!(state.learnings.len(), 7);
        assert_eq!(state.learnings[0].text, "learning-0");
    }

    #[test]
    fn load_missing_file_returns_default_state() {
        let store = StateStore::new(
            std::env::temp_dir().join(format!("growloop-state-{}.json", uuid::Uuid::new_v4())),
        );
        let state = store.load(now());
        assert!(state.current_week.is_none());
        assert!(state.angle_performance.is_empty());
        assert_eq!(state.created_at, now());
    }

    #[test]
    fn load_corrupt_file_returns_default_state() {
        let path =
            std::env::temp_dir().join(format!("growloop-state-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "{not json").unwrap();

        let store = StateStore::new(&path);
        let state = store.load(now());
        assert!(state.learnings.is_empty());

        fs::remove_file(path).ok();
    }

    #[test]
    fn save_then_load_round_trips_except_updated_at() {
        let path =
            std::env::temp_dir().join(format!("growloop-state-{}.json", uuid::Uuid::new_v4()));
        let store = StateStore::new(&path);

        let mut state = store.load(now());
        let later = now() + chrono::Duration::hours(1);
        store.save(&mut state, later).unwrap();

        let reloaded = store.load(now());
        assert_eq!(reloaded.updated_at, later);

        let mut expected = state.clone();
        expected.updated_at = reloaded.updated_at;
        assert_eq!(reloaded, expected);

        fs::remove_file(path).ok();
    }

    #[test]
    fn save_stamps_updated_at() {
        let path =
            std::env::temp_dir().join(format!("growloop-state-{}.json", uuid::Uuid::new_v4()));
        let store = StateStore::new(&path);

        let mut state = WeeklyState::new(now());
        let later = now() + chrono::Duration::days(1);
        store.save(&mut state, later).unwrap();
        assert_eq!(state.updated_at, later);
        assert_eq!(state.created_at, now());

        fs::remove_file(path).ok();
    }
}
