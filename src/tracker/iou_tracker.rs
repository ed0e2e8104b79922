//! Greedy IoU tracker with exponential smoothing.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{NormalizedBox, iou_batch};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::track::{Track, TrackIdAllocator};

/// Configuration for the [`Tracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU between a track and a detection to count as the same object
    pub match_iou: f32,
    /// IoU at which same-frame detections are considered duplicates
    pub nms_iou: f32,
    /// Matches required before a track is shown
    pub min_hits: u32,
    /// Consecutive misses after which a track is dropped
    pub max_misses: u32,
    /// Consecutive misses a confirmed track may have and still be shown
    pub stable_max_misses: u32,
    /// Smoothing factor in `[0, 1]`; 1 follows detections exactly
    pub smooth_alpha: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_iou: 0.25,
            nms_iou: 0.45,
            min_hits: 3,
            max_misses: 4,
            stable_max_misses: 1,
            smooth_alpha: 0.35,
        }
    }
}

/// Owns the track table of one pipeline instance.
#[derive(Debug)]
pub struct Tracker {
    tracks: BTreeMap<u64, Track>,
    ids: TrackIdAllocator,
    config: TrackerConfig,
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_ids(config, TrackIdAllocator::new())
    }

    /// Create a tracker drawing ids from a shared allocator.
    pub fn with_ids(config: TrackerConfig, ids: TrackIdAllocator) -> Self {
        Self {
            tracks: BTreeMap::new(),
            ids,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of live tracks, confirmed or not.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Drop every track. Ids keep increasing afterwards.
    pub fn reset(&mut self) {
        self.tracks.clear();
    }

    /// Advance one tick and return the stable tracks, ordered by id.
    pub fn update(&mut self, detections: Vec<Detection>, now: Instant) -> Vec<Track> {
        for track in self.tracks.values_mut() {
            track.mark_missed();
        }

        let track_ids: Vec<u64> = self.tracks.keys().copied().collect();
        let track_rects: Vec<NormalizedBox> = self.tracks.values().map(|t| t.bbox).collect();
        let det_rects: Vec<NormalizedBox> = detections.iter().map(|d| d.bbox).collect();
        let ious = iou_batch(&track_rects, &det_rects);

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::greedy_assignment(&ious, self.config.match_iou);

        for (itrack, idet) in matches {
            if let Some(track) = self.tracks.get_mut(&track_ids[itrack]) {
                track.update(&detections[idet], self.config.smooth_alpha, now);
            }
        }

        for idet in unmatched_detections {
            let track_id = self.ids.next_id();
            trace!(track_id, "new track");
            self.tracks
                .insert(track_id, Track::new(track_id, &detections[idet], now));
        }

        let max_misses = self.config.max_misses;
        self.tracks.retain(|&track_id, track| {
            let keep = !track.is_expired(max_misses);
            if !keep {
                trace!(track_id, hits = track.hits, "track expired");
            }
            keep
        });

        self.tracks
            .values()
            .filter(|t| t.is_stable(self.config.min_hits, self.config.stable_max_misses))
            .cloned()
            .collect()
    }
}
