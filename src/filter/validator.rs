use super::scene::SceneConstraint;
use super::shape::BoxShape;
use crate::geometry::NormalizedBox;

/// Decides whether a normalized box is a plausible target vehicle.
///
/// Shape checks always apply; scene grounding applies when a constraint is
/// given. Rejection is silent: noisy boxes are expected and simply dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxValidator {
    shape: BoxShape,
}

impl BoxValidator {
    pub fn new(shape: BoxShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> &BoxShape {
        &self.shape
    }

    pub fn is_valid(&self, bbox: &NormalizedBox, scene: Option<&SceneConstraint>) -> bool {
        if !self.shape.accepts(bbox) {
            return false;
        }

        scene.is_none_or(|s| s.accepts(bbox))
    }
}
