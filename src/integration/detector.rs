//! Traits for object detection inference backends.

use std::future::Future;

use serde::{Deserialize, Serialize};

use super::Frame;
use crate::error::Result;

/// Corner coordinates of a detection, in pixels of the frame it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

/// One model output for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub score: f32,
    #[serde(rename = "box")]
    pub bbox: PixelBox,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, score: f32, xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            label: label.into(),
            score,
            bbox: PixelBox {
                xmin,
                ymin,
                xmax,
                ymax,
            },
        }
    }
}

/// A loaded detection model.
///
/// Invocations must be independent of each other: the same instance is
/// shared by every pipeline using the same model id.
///
/// # Example
///
/// ```ignore
/// use roadtrack::{Detector, Frame, RawDetection, Result};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl Detector for MyDetector {
///     async fn detect(&self, frame: &Frame, threshold: f32) -> Result<Vec<RawDetection>> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Detector: Send + Sync + 'static {
    /// Run inference on a frame, returning detections scoring at least
    /// `threshold`. Boxes are in pixels of `frame`.
    fn detect(
        &self,
        frame: &Frame,
        threshold: f32,
    ) -> impl Future<Output = Result<Vec<RawDetection>>> + Send;
}

/// Creates detectors by model id. Called at most once per id by
/// [`DetectorRegistry`](super::DetectorRegistry) unless loading fails.
pub trait DetectorLoader: Send + Sync + 'static {
    type Detector: Detector;

    fn load(&self, model_id: &str) -> impl Future<Output = Result<Self::Detector>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_detection_from_json() {
        let json = r#"[
            { "score": 0.97, "label": "car", "box": { "xmin": 10, "ymin": 20, "xmax": 110, "ymax": 80 } },
            { "score": 0.51, "label": "person", "box": { "xmin": 0, "ymin": 0, "xmax": 5, "ymax": 30 } }
        ]"#;
        let dets: Vec<RawDetection> = serde_json::from_str(json).unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0], RawDetection::new("car", 0.97, 10.0, 20.0, 110.0, 80.0));
        assert_eq!(dets[1].label, "person");
    }
}
