use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::scalar::{clamp, lerp};

/// Axis-aligned box in frame-relative coordinates.
///
/// `x`/`y` are the top-left corner and `width`/`height` the extent, all as
/// fractions of the frame. Boxes built through [`NormalizedBox::from_pixels`]
/// or [`NormalizedBox::clamped`] have every component in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl NormalizedBox {
    /// Create a box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert a pixel-space TLBR box into frame fractions.
    ///
    /// The corners are clamped to the frame first, so a box hanging off the
    /// edge is cropped rather than rejected. Returns `None` for an empty frame.
    pub fn from_pixels(
        xmin: f32,
        ymin: f32,
        xmax: f32,
        ymax: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        if frame_width == 0 || frame_height == 0 {
            return None;
        }
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        let x1 = clamp(xmin, 0.0, fw);
        let y1 = clamp(ymin, 0.0, fh);
        let x2 = clamp(xmax, 0.0, fw);
        let y2 = clamp(ymax, 0.0, fh);

        Some(Self::from_tlbr(x1 / fw, y1 / fh, x2 / fw, y2 / fh).clamped())
    }

    /// Clamp every component into `[0, 1]`.
    #[inline]
    pub fn clamped(&self) -> Self {
        Self {
            x: clamp(self.x, 0.0, 1.0),
            y: clamp(self.y, 0.0, 1.0),
            width: clamp(self.width, 0.0, 1.0),
            height: clamp(self.height, 0.0, 1.0),
        }
    }

    /// Whether the box has a strictly positive extent.
    #[inline]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// `width / height`, or `0.0` for a degenerate box.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }

    /// Y coordinate of the bottom edge, where a vehicle touches the road.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Move every component a fraction `alpha` of the way towards `target`.
    #[inline]
    pub fn smooth_towards(&self, target: &NormalizedBox, alpha: f32) -> Self {
        Self {
            x: lerp(self.x, target.x, alpha),
            y: lerp(self.y, target.y, alpha),
            width: lerp(self.width, target.width, alpha),
            height: lerp(self.height, target.height, alpha),
        }
    }

    /// Scale to percentages of the frame (0-100).
    #[inline]
    pub fn to_percent(&self) -> [f32; 4] {
        [
            self.x * 100.0,
            self.y * 100.0,
            self.width * 100.0,
            self.height * 100.0,
        ]
    }

    /// Calculate Intersection over Union (IoU) with another box.
    pub fn iou(&self, other: &NormalizedBox) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            clamp(inter_area / union_area, 0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Free-function form of [`NormalizedBox::iou`].
#[inline]
pub fn iou(a: &NormalizedBox, b: &NormalizedBox) -> f32 {
    a.iou(b)
}

/// Calculate IoU matrix between two sets of boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[NormalizedBox], boxes_b: &[NormalizedBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_tlbr() {
        let b = NormalizedBox::from_tlbr(0.1, 0.2, 0.4, 0.6);
        assert_relative_eq!(b.width, 0.3, epsilon = 1e-6);
        assert_relative_eq!(b.height, 0.4, epsilon = 1e-6);
        assert_relative_eq!(b.bottom(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_from_pixels_clamps_to_frame() {
        let b = NormalizedBox::from_pixels(-20.0, 100.0, 700.0, 300.0, 640, 400).unwrap();
        assert_eq!(b.x, 0.0);
        assert_relative_eq!(b.y, 0.25, epsilon = 1e-6);
        assert_relative_eq!(b.width, 1.0, epsilon = 1e-6);
        assert_relative_eq!(b.height, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_from_pixels_empty_frame() {
        assert!(NormalizedBox::from_pixels(0.0, 0.0, 10.0, 10.0, 0, 480).is_none());
    }

    #[test]
    fn test_inverted_pixels_have_no_area() {
        let b = NormalizedBox::from_pixels(50.0, 50.0, 10.0, 10.0, 100, 100).unwrap();
        assert!(!b.has_area());
    }

    #[test]
    fn test_iou() {
        let a = NormalizedBox::new(0.0, 0.0, 0.1, 0.1);
        let b = NormalizedBox::new(0.05, 0.05, 0.1, 0.1);

        // Intersection 0.05^2, union 2 * 0.1^2 - 0.05^2
        let expected = 0.0025 / (0.02 - 0.0025);
        assert_relative_eq!(a.iou(&b), expected, epsilon = 1e-5);
        assert_relative_eq!(b.iou(&a), a.iou(&b));
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = NormalizedBox::new(0.0, 0.0, 0.1, 0.1);
        let b = NormalizedBox::new(0.5, 0.5, 0.1, 0.1);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = NormalizedBox::new(0.2, 0.3, 0.25, 0.1);
        assert_relative_eq!(a.iou(&a), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_iou_zero_union() {
        let a = NormalizedBox::new(0.2, 0.2, 0.0, 0.0);
        assert_eq!(iou(&a, &a), 0.0);
    }

    #[test]
    fn test_iou_bounds_and_symmetry() {
        let boxes = [
            NormalizedBox::new(0.0, 0.0, 0.5, 0.5),
            NormalizedBox::new(0.25, 0.25, 0.5, 0.5),
            NormalizedBox::new(0.1, 0.6, 0.3, 0.2),
            NormalizedBox::new(0.0, 0.0, 1.0, 1.0),
            NormalizedBox::new(0.9, 0.9, 0.0, 0.1),
        ];
        for a in &boxes {
            for b in &boxes {
                let ab = iou(a, b);
                assert!((0.0..=1.0).contains(&ab));
                assert_eq!(ab, iou(b, a));
            }
        }
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [NormalizedBox::new(0.0, 0.0, 0.1, 0.1); 3];
        let b = [NormalizedBox::new(0.0, 0.0, 0.1, 0.1); 2];
        let m = iou_batch(&a, &b);
        assert_eq!(m.dim(), (3, 2));
        assert_relative_eq!(m[[2, 1]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_smooth_towards() {
        let old = NormalizedBox::new(0.0, 0.0, 0.2, 0.2);
        let target = NormalizedBox::new(1.0, 0.5, 0.4, 0.2);
        let s = old.smooth_towards(&target, 0.5);
        assert_relative_eq!(s.x, 0.5);
        assert_relative_eq!(s.y, 0.25);
        assert_relative_eq!(s.width, 0.3, epsilon = 1e-6);
        assert_relative_eq!(s.height, 0.2);
    }
}
