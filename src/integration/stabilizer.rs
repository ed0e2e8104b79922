//! Per-tick chain from raw detections to stable overlay boxes.

use std::time::Instant;

use tracing::debug;

use super::RawDetection;
use crate::config::PipelineConfig;
use crate::filter::{BoxValidator, SceneConstraint, non_max_suppression};
use crate::geometry::NormalizedBox;
use crate::tracker::{Detection, TrackIdAllocator, TrackedBox, Tracker};

/// Filters one frame's detections and feeds them to the tracker.
///
/// This is the synchronous core of a pipeline instance: class filter,
/// normalization, confidence gate, box validation, NMS, tracker update.
#[derive(Debug)]
pub struct Stabilizer {
    config: PipelineConfig,
    validator: BoxValidator,
    tracker: Tracker,
}

impl Stabilizer {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_ids(config, TrackIdAllocator::new())
    }

    pub fn with_ids(config: PipelineConfig, ids: TrackIdAllocator) -> Self {
        Self {
            validator: BoxValidator::new(config.shape),
            tracker: Tracker::with_ids(config.tracker.clone(), ids),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker {
        &mut self.tracker
    }

    /// Target-class detections above the confidence threshold, converted to
    /// frame fractions. Nothing is validated yet.
    pub fn normalize(
        &self,
        raw: &[RawDetection],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection> {
        raw.iter()
            .filter(|r| self.config.is_target_label(&r.label))
            .filter(|r| r.score >= self.config.confidence_threshold)
            .filter_map(|r| {
                let b = r.bbox;
                NormalizedBox::from_pixels(b.xmin, b.ymin, b.xmax, b.ymax, frame_width, frame_height)
                    .map(|bbox| Detection::from_rect(bbox, r.score))
            })
            .collect()
    }

    /// Valid, de-duplicated candidates for this frame.
    pub fn candidates(
        &self,
        raw: &[RawDetection],
        frame_width: u32,
        frame_height: u32,
        scene: Option<&SceneConstraint>,
    ) -> Vec<Detection> {
        let normalized = self.normalize(raw, frame_width, frame_height);
        let valid: Vec<Detection> = normalized
            .into_iter()
            .filter(|d| self.validator.is_valid(&d.bbox, scene))
            .collect();
        non_max_suppression(&valid, self.config.tracker.nms_iou)
    }

    /// Run one tick and return the boxes to draw.
    pub fn process(
        &mut self,
        raw: &[RawDetection],
        frame_width: u32,
        frame_height: u32,
        scene: Option<&SceneConstraint>,
        now: Instant,
    ) -> Vec<TrackedBox> {
        let candidates = self.candidates(raw, frame_width, frame_height, scene);
        let candidate_count = candidates.len();

        let stable = self.tracker.update(candidates, now);
        debug!(
            raw = raw.len(),
            candidates = candidate_count,
            live_tracks = self.tracker.len(),
            stable = stable.len(),
            "tick processed"
        );

        stable
            .iter()
            .map(|t| TrackedBox::from_track(t, &self.config.id_prefix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            confidence_threshold: 0.5,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_non_target_labels_dropped() {
        let s = Stabilizer::new(config());
        let raw = vec![
            RawDetection::new("person", 0.99, 100.0, 100.0, 200.0, 150.0),
            RawDetection::new("CAR", 0.99, 100.0, 300.0, 200.0, 350.0),
        ];
        let dets = s.normalize(&raw, 1000, 500);
        assert_eq!(dets.len(), 1);
        assert!((dets[0].bbox.y - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_gate() {
        let s = Stabilizer::new(config());
        let raw = vec![RawDetection::new("car", 0.4, 100.0, 300.0, 200.0, 350.0)];
        assert!(s.normalize(&raw, 1000, 500).is_empty());
    }

    #[test]
    fn test_candidates_validated_and_deduplicated() {
        let s = Stabilizer::new(config());
        let raw = vec![
            RawDetection::new("car", 0.90, 100.0, 300.0, 250.0, 340.0),
            RawDetection::new("car", 0.95, 102.0, 301.0, 252.0, 341.0),
            // Tall and thin: not a car
            RawDetection::new("car", 0.99, 600.0, 100.0, 630.0, 300.0),
        ];
        let candidates = s.candidates(&raw, 1000, 500, None);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, 0.95);
    }

    #[test]
    fn test_process_emits_after_min_hits() {
        let mut s = Stabilizer::new(config());
        let raw = vec![RawDetection::new("car", 0.9, 100.0, 300.0, 250.0, 340.0)];
        let now = Instant::now();

        assert!(s.process(&raw, 1000, 500, None, now).is_empty());
        assert!(s.process(&raw, 1000, 500, None, now).is_empty());
        let out = s.process(&raw, 1000, 500, None, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, format!("car-{}", out[0].tracking_id));
        assert!((out[0].x - 10.0).abs() < 1e-3);
        assert!((out[0].y - 60.0).abs() < 1e-3);
    }
}
