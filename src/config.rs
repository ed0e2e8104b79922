use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::BoxShape;
use crate::tracker::TrackerConfig;

/// Everything one pipeline instance needs, with defaults tuned for
/// high-confidence car detection on traffic footage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Registry key of the detector to use
    pub model_id: String,
    /// Class labels to keep, compared case-insensitively
    pub target_labels: Vec<String>,
    pub confidence_threshold: f32,
    /// Delay between the end of one tick and the start of the next
    pub interval_ms: u64,
    /// Frames wider than this are downscaled before detection
    pub max_frame_width: u32,
    /// Camera id used to resolve a scene constraint
    pub scene_id: Option<String>,
    /// Prefix of the display id, e.g. `car` gives `car-12`
    pub id_prefix: String,
    pub shape: BoxShape,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: "Xenova/yolos-tiny".to_string(),
            target_labels: vec!["car".to_string(), "automobile".to_string()],
            confidence_threshold: 0.92,
            interval_ms: 350,
            max_frame_width: 640,
            scene_id: None,
            id_prefix: "car".to_string(),
            shape: BoxShape::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Case-insensitive membership in `target_labels`.
    pub fn is_target_label(&self, label: &str) -> bool {
        self.target_labels
            .iter()
            .any(|target| target.eq_ignore_ascii_case(label))
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_labels.is_empty() {
            return Err(Error::Config("target_labels must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence_threshold {} outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if self.interval_ms == 0 {
            return Err(Error::Config("interval_ms must be positive".into()));
        }
        if self.max_frame_width == 0 {
            return Err(Error::Config("max_frame_width must be positive".into()));
        }
        for (name, value) in [
            ("smooth_alpha", self.tracker.smooth_alpha),
            ("match_iou", self.tracker.match_iou),
            ("nms_iou", self.tracker.nms_iou),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{name} {value} outside [0, 1]")));
            }
        }
        let shape = &self.shape;
        for (name, range) in [
            ("shape.aspect_ratio", shape.aspect_ratio),
            ("shape.area", shape.area),
            ("shape.width", shape.width),
            ("shape.height", shape.height),
        ] {
            if range.min > range.max {
                return Err(Error::Config(format!(
                    "{name} min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }
        if self.tracker.min_hits == 0 {
            return Err(Error::Config("min_hits must be at least 1".into()));
        }
        if self.tracker.stable_max_misses > self.tracker.max_misses {
            return Err(Error::Config(format!(
                "stable_max_misses {} exceeds max_misses {}",
                self.tracker.stable_max_misses, self.tracker.max_misses
            )));
        }
        Ok(())
    }
}
