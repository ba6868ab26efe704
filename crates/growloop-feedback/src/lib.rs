mod classifier;
mod cluster;
mod noise;
mod report;
mod types;

pub use classifier::{classify_all, ClassifySummary, CLASSIFY_PROMPT};
pub use cluster::{Clusterer, FallbackClusterer, LlmClusterer, INSIGHTS_PROMPT};
pub use noise::{apply_weight, NoiseFilter};
pub use report::{generate_report, PrioritySummary, SynthesisReport};
pub use types::{
    Action, ClassifiedItem, Classification, FeedbackItem, Insight, Intensity, NoiseReason,
    SynthesisOutcome,
};
