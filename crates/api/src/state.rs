//! Application state for the API server.

use matchmate_matcher::RecommendationPipeline;
use std::path::PathBuf;

/// Shared, read-only state for request handlers.
pub struct AppState {
    pub pipeline: RecommendationPipeline,

    /// Roster source read on each run.
    pub roster_path: PathBuf,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(pipeline: RecommendationPipeline, roster_path: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            roster_path: roster_path.into(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
