use serde::Serialize;

use crate::tracker::{TrackSummary, TrackedBox};

/// Lifecycle of a pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Not enabled
    #[default]
    Idle,
    /// Waiting for the detector to load
    Loading,
    /// Detector loaded, next tick due
    Ready,
    /// Detector running on the current frame
    Detecting,
    /// Folding detections into the tracker
    Updating,
    /// Waiting for the next tick
    Scheduled,
    /// Detector failed to load; terminal until re-enabled
    Error,
}

/// What the rendering layer needs to draw the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub tracks: Vec<TrackedBox>,
    pub is_model_loading: bool,
    pub error: Option<String>,
    /// Completed ticks since the last enable, skipped ticks excluded
    pub ticks: u64,
}

impl PipelineStatus {
    pub fn summary(&self) -> TrackSummary {
        TrackSummary::from_boxes(&self.tracks)
    }
}
