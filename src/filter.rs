//! Per-frame filtering applied before tracking: shape and scene validation,
//! then duplicate suppression.

mod nms;
mod scene;
mod shape;
mod validator;

pub use nms::non_max_suppression;
pub use scene::{
    PerspectiveBounds, SceneConstraint, SceneConstraintProvider, SceneTable, SizeBounds,
    Unconstrained,
};
pub use shape::{BoxShape, ValueRange};
pub use validator::BoxValidator;
