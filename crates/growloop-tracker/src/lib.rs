mod aggregate;
mod engagement;
mod router;
mod types;

pub use aggregate::{aggregate_by, analyze_posts, build_metrics_artifact, find_performers};
pub use engagement::{classify_engagement, engagement_rate, save_rate, time_slot};
pub use router::{
    content_feedback, scout_feedback, ContentFeedback, PerformanceContext, Recommendations,
    ScoutFeedback,
};
pub use types::{
    Aggregations, AnalyzedPost, Derived, EngagementClass, GroupStats, InsightsReport,
    MetricsArtifact, MixAdjustments, NextWeekAdjustments, PerformerRef, Performers,
    PillarAdjustments, PostMetrics, TimingAdjustments, TopPerformerAnalysis, WeeklyMetrics,
};
