//! Matching utilities for frame-to-frame association.

use ndarray::Array2;

use crate::geometry::NormalizedBox;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Normalized bounding box
    pub bbox: NormalizedBox,
    /// Detection confidence score
    pub score: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: NormalizedBox::from_tlbr(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_rect(bbox: NormalizedBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(track_index, detection_index)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy one-to-one assignment over an IoU matrix (tracks × detections).
///
/// Detections are visited in column order. Each takes the still-free track
/// with the highest IoU, provided that IoU is at least `min_iou`; the first
/// track reaching the maximum wins ties.
pub fn greedy_assignment(ious: &Array2<f32>, min_iou: f32) -> AssignmentResult {
    let (num_tracks, num_dets) = ious.dim();

    let mut track_taken = vec![false; num_tracks];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for j in 0..num_dets {
        let mut best: Option<(usize, f32)> = None;
        for i in 0..num_tracks {
            if track_taken[i] {
                continue;
            }
            let score = ious[[i, j]];
            if score < min_iou {
                continue;
            }
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, _)) => {
                track_taken[i] = true;
                matches.push((i, j));
            }
            None => unmatched_detections.push(j),
        }
    }

    let unmatched_tracks = track_taken
        .iter()
        .enumerate()
        .filter_map(|(i, &taken)| if taken { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
