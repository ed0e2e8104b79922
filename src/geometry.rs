//! Pure geometric helpers shared by the filters and the tracker.

mod polygon;
mod rect;
mod scalar;

pub use polygon::point_in_polygon;
pub use rect::{NormalizedBox, iou, iou_batch};
pub use scalar::{clamp, lerp};
