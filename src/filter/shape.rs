use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedBox;

/// Inclusive `[min, max]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Plausible shape of the target class, relative to the frame.
///
/// The defaults are tuned for cars in typical traffic-camera footage:
/// wider than tall, between 0.25% and 18% of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxShape {
    /// `width / height`
    pub aspect_ratio: ValueRange,
    /// `width * height`
    pub area: ValueRange,
    pub width: ValueRange,
    pub height: ValueRange,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            aspect_ratio: ValueRange::new(1.1, 4.8),
            area: ValueRange::new(0.0025, 0.18),
            width: ValueRange::new(0.03, 0.55),
            height: ValueRange::new(0.02, 0.35),
        }
    }
}

impl BoxShape {
    /// Shape checks only; scene grounding lives in the validator.
    pub fn accepts(&self, bbox: &NormalizedBox) -> bool {
        if !bbox.has_area() {
            return false;
        }

        self.aspect_ratio.contains(bbox.aspect_ratio())
            && self.area.contains(bbox.area())
            && self.width.contains(bbox.width)
            && self.height.contains(bbox.height)
    }
}
