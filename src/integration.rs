//! Integration module connecting a detector and a video source to the
//! stabilization chain.
//!
//! [`Stabilizer`] is the synchronous per-tick core. [`PipelineDriver`] wraps
//! it in a cancellable async loop that loads the detector through a shared
//! [`DetectorRegistry`] and publishes [`PipelineStatus`] updates.

mod cancel;
mod detector;
mod driver;
mod frame;
mod registry;
mod stabilizer;
mod status;

pub use detector::{Detector, DetectorLoader, PixelBox, RawDetection};
pub use driver::PipelineDriver;
pub use frame::{Frame, FrameSource};
pub use registry::DetectorRegistry;
pub use stabilizer::Stabilizer;
pub use status::{PipelineState, PipelineStatus};
