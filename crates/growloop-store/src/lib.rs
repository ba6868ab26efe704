mod artifacts;
mod state;
mod week;

pub use artifacts::{Artifact, ArtifactStore};
pub use state::{
    CarryForward, Learning, PerformanceEntry, StateStore, WeekMetrics, WeekRecord, WeeklyState,
    MAX_LEARNINGS,
};
pub use week::{week_id, week_start};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
