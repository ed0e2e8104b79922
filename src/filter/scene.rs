//! Per-camera grounding: where on the frame a real vehicle can appear.

use std::collections::HashMap;
use std::path::Path;

use nalgebra as na;
use serde::{Deserialize, Serialize};

use super::shape::ValueRange;
use crate::error::Result;
use crate::geometry::{NormalizedBox, clamp, lerp, point_in_polygon};

/// Allowed box size at one vertical position of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub width: ValueRange,
    pub height: ValueRange,
}

impl SizeBounds {
    fn lerp(&self, other: &SizeBounds, t: f32) -> SizeBounds {
        let mix = |a: &ValueRange, b: &ValueRange| {
            ValueRange::new(lerp(a.min, b.min, t), lerp(a.max, b.max, t))
        };
        SizeBounds {
            width: mix(&self.width, &other.width),
            height: mix(&self.height, &other.height),
        }
    }
}

/// Size bounds that scale with distance from the camera.
///
/// Vehicles near the horizon are small, vehicles near the frame bottom are
/// large. The allowed range for a box is interpolated between the two ends
/// using the vertical position of its bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveBounds {
    pub at_horizon: SizeBounds,
    pub at_bottom: SizeBounds,
}

impl PerspectiveBounds {
    /// Interpolated bounds for a box whose bottom edge sits at `bottom`.
    pub fn bounds_at(&self, bottom: f32, horizon_y: f32) -> SizeBounds {
        let depth = 1.0 - horizon_y;
        let t = if depth > 0.0 {
            clamp((bottom - horizon_y) / depth, 0.0, 1.0)
        } else {
            1.0
        };
        self.at_horizon.lerp(&self.at_bottom, t)
    }
}

/// Where valid objects may appear for one camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConstraint {
    /// Normalized y of the horizon; a box must touch the ground below it.
    pub horizon_y: Option<f32>,
    /// Road surface polygon in normalized coordinates.
    pub ground_region: Option<Vec<na::Point2<f32>>>,
    pub perspective: Option<PerspectiveBounds>,
}

/// Fraction of the box height above the bottom edge where ground probes sit.
const GROUND_PROBE_INSET: f32 = 0.02;

impl SceneConstraint {
    /// A constraint that accepts every box.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Points along the bottom edge used to test ground contact.
    ///
    /// Probes sit slightly above the edge so boxes resting on the frame
    /// bottom are not pushed onto the polygon boundary.
    pub fn ground_probes(bbox: &NormalizedBox) -> [na::Point2<f32>; 3] {
        let y = bbox.bottom() - bbox.height * GROUND_PROBE_INSET;
        [
            na::Point2::new(bbox.x + bbox.width * 0.25, y),
            na::Point2::new(bbox.x + bbox.width * 0.5, y),
            na::Point2::new(bbox.x + bbox.width * 0.75, y),
        ]
    }

    /// Whether the box is grounded inside this scene.
    pub fn accepts(&self, bbox: &NormalizedBox) -> bool {
        let bottom = bbox.bottom();

        if let Some(horizon_y) = self.horizon_y {
            if bottom < horizon_y {
                return false;
            }
        }

        if let Some(region) = &self.ground_region {
            let grounded = Self::ground_probes(bbox)
                .iter()
                .all(|p| point_in_polygon(*p, region));
            if !grounded {
                return false;
            }
        }

        if let Some(perspective) = &self.perspective {
            let bounds = perspective.bounds_at(bottom, self.horizon_y.unwrap_or(0.0));
            if !bounds.width.contains(bbox.width) || !bounds.height.contains(bbox.height) {
                return false;
            }
        }

        true
    }
}

/// Resolves the grounding constraint for a scene (camera) id.
pub trait SceneConstraintProvider: Send + Sync {
    /// Constraint for `scene_id`, or the provider's default when unknown.
    fn lookup(&self, scene_id: &str) -> Option<&SceneConstraint>;

    /// Constraint used when no scene id is configured.
    fn fallback(&self) -> Option<&SceneConstraint> {
        None
    }

    fn resolve(&self, scene_id: Option<&str>) -> Option<&SceneConstraint> {
        match scene_id {
            Some(id) => self.lookup(id),
            None => self.fallback(),
        }
    }
}

/// Provider for pipelines without any scene grounding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl SceneConstraintProvider for Unconstrained {
    fn lookup(&self, _scene_id: &str) -> Option<&SceneConstraint> {
        None
    }
}

/// Static table of scene constraints with an optional default entry.
///
/// Deserializes from `{ "default": {...}, "scenes": { "<id>": {...} } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTable {
    pub default: Option<SceneConstraint>,
    pub scenes: HashMap<String, SceneConstraint>,
}

impl SceneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, constraint: SceneConstraint) -> Self {
        self.default = Some(constraint);
        self
    }

    pub fn with_scene(mut self, scene_id: impl Into<String>, constraint: SceneConstraint) -> Self {
        self.scenes.insert(scene_id.into(), constraint);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

impl SceneConstraintProvider for SceneTable {
    fn lookup(&self, scene_id: &str) -> Option<&SceneConstraint> {
        self.scenes.get(scene_id).or(self.default.as_ref())
    }

    fn fallback(&self) -> Option<&SceneConstraint> {
        self.default.as_ref()
    }
}
