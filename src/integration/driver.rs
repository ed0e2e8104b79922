//! Async tick loop tying a detector, a frame source and a [`Stabilizer`]
//! together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cancel::{CancelHandle, CancelToken, cancel_pair};
use super::{
    Detector, DetectorLoader, DetectorRegistry, FrameSource, PipelineState, PipelineStatus,
    RawDetection, Stabilizer,
};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::filter::SceneConstraintProvider;
use crate::tracker::TrackIdAllocator;

const TIMING_REPORT_EVERY: u64 = 300;

/// Runs the detection pipeline for one video source.
///
/// While enabled, a background task loads the detector through the shared
/// registry and then runs one tick at a time, sleeping `interval_ms` between
/// the end of a tick and the start of the next. Progress is published as a
/// [`PipelineStatus`] on a watch channel.
///
/// Failures never escape the loop: a load failure parks the pipeline in
/// [`PipelineState::Error`], a tick failure sets `error` and keeps the last
/// published tracks.
pub struct PipelineDriver<L: DetectorLoader, F: FrameSource> {
    registry: Arc<DetectorRegistry<L>>,
    source: Arc<F>,
    scenes: Arc<dyn SceneConstraintProvider>,
    config: PipelineConfig,
    ids: TrackIdAllocator,
    status: Arc<watch::Sender<PipelineStatus>>,
    running: Option<Running>,
}

struct Running {
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl<L: DetectorLoader, F: FrameSource> PipelineDriver<L, F> {
    pub fn new(
        registry: Arc<DetectorRegistry<L>>,
        source: Arc<F>,
        scenes: Arc<dyn SceneConstraintProvider>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (status, _) = watch::channel(PipelineStatus::default());
        Ok(Self {
            registry,
            source,
            scenes,
            config,
            ids: TrackIdAllocator::new(),
            status: Arc::new(status),
            running: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Snapshot of the current status.
    pub fn status(&self) -> PipelineStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.status.subscribe()
    }

    /// Whether a tick loop is alive. A pipeline whose detector failed to
    /// load reports `false` and can be enabled again.
    pub fn is_enabled(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Start loading the detector and ticking.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn enable(&mut self) {
        if self.is_enabled() {
            return;
        }

        let (cancel, token) = cancel_pair();
        self.status.send_replace(PipelineStatus {
            state: PipelineState::Loading,
            is_model_loading: true,
            ..PipelineStatus::default()
        });

        let tick_loop = TickLoop {
            registry: Arc::clone(&self.registry),
            source: Arc::clone(&self.source),
            scenes: Arc::clone(&self.scenes),
            config: self.config.clone(),
            ids: self.ids.clone(),
            status: Arc::clone(&self.status),
            cancel: token,
        };

        info!(model_id = %self.config.model_id, scene_id = ?self.config.scene_id, "pipeline enabled");
        self.running = Some(Running {
            cancel,
            task: tokio::spawn(tick_loop.run()),
        });
    }

    /// Stop ticking and clear the published tracks.
    ///
    /// A detector call already in flight is allowed to finish, but its result
    /// is dropped.
    pub fn disable(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        // Cancel under the channel lock so the loop cannot publish in between.
        self.status.send_modify(|status| {
            running.cancel.cancel();
            *status = PipelineStatus::default();
        });
        info!("pipeline disabled");
    }
}

impl<L: DetectorLoader, F: FrameSource> Drop for PipelineDriver<L, F> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

#[derive(Debug, Default)]
struct TickTimings {
    ticks: u64,
    detect: Duration,
}

impl TickTimings {
    fn record(&mut self, elapsed: Duration) {
        self.ticks += 1;
        self.detect += elapsed;

        if self.ticks % TIMING_REPORT_EVERY == 0 {
            info!(
                ticks = self.ticks,
                detect_ms_per_tick = format!(
                    "{:.2}",
                    self.detect.as_secs_f64() * 1000.0 / self.ticks as f64
                ),
                "pipeline detect timings"
            );
        }
    }
}

struct TickLoop<L: DetectorLoader, F: FrameSource> {
    registry: Arc<DetectorRegistry<L>>,
    source: Arc<F>,
    scenes: Arc<dyn SceneConstraintProvider>,
    config: PipelineConfig,
    ids: TrackIdAllocator,
    status: Arc<watch::Sender<PipelineStatus>>,
    cancel: CancelToken,
}

impl<L: DetectorLoader, F: FrameSource> TickLoop<L, F> {
    /// Apply `update` unless the loop has been cancelled.
    fn publish(&self, update: impl FnOnce(&mut PipelineStatus)) -> bool {
        self.status.send_if_modified(|status| {
            if self.cancel.is_cancelled() {
                return false;
            }
            update(status);
            true
        })
    }

    async fn run(mut self) {
        let detector = match self.registry.get(&self.config.model_id).await {
            Ok(detector) => detector,
            Err(err) => {
                self.publish(|s| {
                    s.state = PipelineState::Error;
                    s.is_model_loading = false;
                    s.error = Some(err.to_string());
                });
                return;
            }
        };

        let ready = self.publish(|s| {
            s.state = PipelineState::Ready;
            s.is_model_loading = false;
        });
        if !ready {
            return;
        }

        let mut stabilizer = Stabilizer::with_ids(self.config.clone(), self.ids.clone());
        let mut timings = TickTimings::default();
        let interval = self.config.interval();

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.tick(detector.as_ref(), &mut stabilizer, &mut timings)
                .await;
            self.publish(|s| s.state = PipelineState::Scheduled);

            let cancelled = tokio::select! {
                _ = self.cancel.cancelled() => true,
                _ = tokio::time::sleep(interval) => false,
            };
            if cancelled {
                break;
            }
            self.publish(|s| s.state = PipelineState::Ready);
        }
        debug!("tick loop stopped");
    }

    async fn tick(
        &self,
        detector: &L::Detector,
        stabilizer: &mut Stabilizer,
        timings: &mut TickTimings,
    ) {
        if !self.source.has_frame() {
            debug!("frame source not ready, skipping tick");
            return;
        }

        self.publish(|s| s.state = PipelineState::Detecting);
        let started = Instant::now();
        let result = self.detect(detector).await;
        timings.record(started.elapsed());

        let (raw, width, height) = match result {
            Ok(detected) => detected,
            Err(err) => {
                warn!(error = %err, "tick failed");
                self.publish(|s| s.error = Some(err.to_string()));
                return;
            }
        };

        if self.cancel.is_cancelled() {
            debug!(raw = raw.len(), "discarding detections of a cancelled tick");
            return;
        }

        self.publish(|s| s.state = PipelineState::Updating);
        let scene = self.scenes.resolve(self.config.scene_id.as_deref());
        let tracks = stabilizer.process(&raw, width, height, scene, Instant::now());

        self.publish(move |s| {
            s.tracks = tracks;
            s.error = None;
            s.ticks += 1;
        });
    }

    async fn detect(&self, detector: &L::Detector) -> Result<(Vec<RawDetection>, u32, u32)> {
        let frame = self
            .source
            .read_frame()?
            .downscaled(self.config.max_frame_width);
        if frame.is_empty() {
            return Err(Error::Frame("source returned an empty frame".into()));
        }

        let raw = detector
            .detect(&frame, self.config.confidence_threshold)
            .await?;
        Ok((raw, frame.width(), frame.height()))
    }
}
