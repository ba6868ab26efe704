mod batch;
mod score;
mod types;

pub use batch::{dedup_by_handle, format_batch, score_all, ScoreSummary, TierCounts};
pub use score::{activity_level, assign_tier, score_prospect};
pub use types::{
    ActivityLevel, Analysis, Candidate, Outreach, ProspectBatch, ProspectContext, ProspectRecord,
    ProspectSignal, Score, ScoreBreakdown, ScoredProspect, Signal, Tier,
};
