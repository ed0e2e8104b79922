//! Temporally stable vehicle tracking over noisy per-frame detections.
//!
//! Raw boxes from an object detector are filtered by class, shape and scene
//! grounding, de-duplicated with non-max suppression and associated across
//! frames by a greedy IoU tracker with exponential smoothing. Only tracks
//! confirmed over several frames are emitted, in percent-of-frame
//! coordinates ready for an overlay.
//!
//! ```ignore
//! use std::sync::Arc;
//! use roadtrack::{DetectorRegistry, PipelineConfig, PipelineDriver, SceneTable};
//!
//! let registry = Arc::new(DetectorRegistry::new(MyLoader::default()));
//! let scenes = Arc::new(SceneTable::load("scenes.json")?);
//! let mut driver = PipelineDriver::new(registry, Arc::new(camera), scenes, PipelineConfig::default())?;
//! driver.enable();
//! let mut status = driver.subscribe();
//! while status.changed().await.is_ok() {
//!     draw(&status.borrow().tracks);
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod integration;
pub mod tracker;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use filter::{BoxShape, BoxValidator, SceneConstraint, SceneConstraintProvider, SceneTable};
pub use geometry::NormalizedBox;
pub use integration::{
    Detector, DetectorLoader, DetectorRegistry, Frame, FrameSource, PipelineDriver, PipelineState,
    PipelineStatus, RawDetection, Stabilizer,
};
pub use tracker::{Detection, Track, TrackedBox, Tracker, TrackerConfig};
