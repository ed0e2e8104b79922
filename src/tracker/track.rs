//! Single tracked object and its rendered form.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::geometry::NormalizedBox;
use crate::tracker::matching::Detection;

/// Hands out monotonically increasing track ids.
///
/// Clones share the same counter, so trackers created from one allocator
/// never reuse an id.
#[derive(Debug, Clone, Default)]
pub struct TrackIdAllocator {
    last: Arc<AtomicU64>,
}

impl TrackIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the next unique track ID, starting at 1.
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Persistent identity for one physical object.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Exponentially smoothed box
    pub bbox: NormalizedBox,
    /// Confidence of the latest matched detection
    pub score: f32,
    /// Successful matches, including the detection that created the track
    pub hits: u32,
    /// Consecutive ticks without a match
    pub misses: u32,
    pub last_seen_at: Instant,
}

impl Track {
    pub fn new(track_id: u64, det: &Detection, now: Instant) -> Self {
        Self {
            track_id,
            bbox: det.bbox,
            score: det.score,
            hits: 1,
            misses: 0,
            last_seen_at: now,
        }
    }

    /// Fold a matched detection into the track.
    pub fn update(&mut self, det: &Detection, alpha: f32, now: Instant) {
        self.bbox = self.bbox.smooth_towards(&det.bbox, alpha);
        self.score = det.score;
        self.hits += 1;
        self.misses = 0;
        self.last_seen_at = now;
    }

    pub fn mark_missed(&mut self) {
        self.misses += 1;
    }

    pub fn is_expired(&self, max_misses: u32) -> bool {
        self.misses > max_misses
    }

    /// Confirmed and seen recently enough to stay on screen.
    pub fn is_stable(&self, min_hits: u32, stable_max_misses: u32) -> bool {
        self.hits >= min_hits && self.misses <= stable_max_misses
    }
}

/// A stable track in overlay coordinates (percent of frame, 0-100).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedBox {
    /// Display key, e.g. `car-7`
    pub id: String,
    pub tracking_id: u64,
    pub confidence: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TrackedBox {
    pub fn from_track(track: &Track, id_prefix: &str) -> Self {
        let [x, y, width, height] = track.bbox.to_percent();
        Self {
            id: format!("{}-{}", id_prefix, track.track_id),
            tracking_id: track.track_id,
            confidence: track.score,
            x,
            y,
            width,
            height,
        }
    }
}

/// Aggregate figures for an overlay badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub total: usize,
    pub average_confidence: f32,
}

impl TrackSummary {
    pub fn from_boxes(boxes: &[TrackedBox]) -> Self {
        if boxes.is_empty() {
            return Self::default();
        }
        let sum: f32 = boxes.iter().map(|b| b.confidence).sum();
        Self {
            total: boxes.len(),
            average_confidence: sum / boxes.len() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_allocator_is_shared_between_clones() {
        let ids = TrackIdAllocator::new();
        let other = ids.clone();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(other.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_update_smooths_and_resets_misses() {
        let now = Instant::now();
        let mut track = Track::new(1, &Detection::new(0.0, 0.0, 0.2, 0.1, 0.9), now);
        track.mark_missed();
        track.mark_missed();

        track.update(&Detection::new(0.1, 0.0, 0.3, 0.1, 0.8), 0.5, now);
        assert_relative_eq!(track.bbox.x, 0.05, epsilon = 1e-6);
        assert_relative_eq!(track.bbox.width, 0.2, epsilon = 1e-6);
        assert_eq!(track.score, 0.8);
        assert_eq!(track.hits, 2);
        assert_eq!(track.misses, 0);
    }

    #[test]
    fn test_tracked_box_in_percent() {
        let track = Track::new(
            7,
            &Detection::from_rect(NormalizedBox::new(0.1, 0.25, 0.2, 0.5), 0.95),
            Instant::now(),
        );
        let tb = TrackedBox::from_track(&track, "car");
        assert_eq!(tb.id, "car-7");
        assert_eq!(tb.tracking_id, 7);
        assert_relative_eq!(tb.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(tb.y, 25.0, epsilon = 1e-4);
        assert_relative_eq!(tb.width, 20.0, epsilon = 1e-4);
        assert_relative_eq!(tb.height, 50.0, epsilon = 1e-4);

        let json = serde_json::to_value(&tb).unwrap();
        assert_eq!(json["trackingId"], 7);
    }

    #[test]
    fn test_summary() {
        let mk = |id: u64, score: f32| {
            TrackedBox::from_track(
                &Track::new(
                    id,
                    &Detection::from_rect(NormalizedBox::new(0.0, 0.0, 0.1, 0.1), score),
                    Instant::now(),
                ),
                "car",
            )
        };
        let summary = TrackSummary::from_boxes(&[mk(1, 0.8), mk(2, 1.0)]);
        assert_eq!(summary.total, 2);
        assert_relative_eq!(summary.average_confidence, 0.9, epsilon = 1e-6);
        assert_eq!(TrackSummary::from_boxes(&[]), TrackSummary::default());
    }
}
