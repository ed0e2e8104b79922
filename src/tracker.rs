mod iou_tracker;
mod matching;
mod track;

pub use iou_tracker::{Tracker, TrackerConfig};
pub use matching::{AssignmentResult, Detection, greedy_assignment};
pub use track::{Track, TrackIdAllocator, TrackSummary, TrackedBox};
