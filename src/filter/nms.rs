use crate::tracker::Detection;

/// Greedy non-max suppression over one frame's detections.
///
/// Detections are visited by descending score; one is kept only if its IoU
/// with every box kept so far is strictly below `iou_threshold`. The sort is
/// stable, so equal scores keep their input order.
pub fn non_max_suppression(detections: &[Detection], iou_threshold: f32) -> Vec<Detection> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::with_capacity(sorted.len());
    for det in sorted {
        if kept.iter().all(|k| k.bbox.iou(&det.bbox) < iou_threshold) {
            kept.push(det);
        }
    }
    kept
}
