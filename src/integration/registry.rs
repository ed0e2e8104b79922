use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::DetectorLoader;
use crate::error::Result;

type Slot<D> = Arc<OnceCell<Arc<D>>>;

/// Lazily loads and shares detectors by model id.
///
/// The first caller for an id triggers the load; concurrent callers wait for
/// it and every later caller gets the same instance. A failed load leaves the
/// slot empty, so the next caller tries again.
pub struct DetectorRegistry<L: DetectorLoader> {
    loader: L,
    slots: Mutex<HashMap<String, Slot<L::Detector>>>,
}

impl<L: DetectorLoader> DetectorRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Whether a detector for `model_id` is already loaded.
    pub fn is_loaded(&self, model_id: &str) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_id)
            .is_some_and(|slot| slot.initialized())
    }

    pub async fn get(&self, model_id: &str) -> Result<Arc<L::Detector>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(model_id.to_string()).or_default())
        };

        let detector = slot
            .get_or_try_init(|| async {
                info!(model_id, "loading detection model");
                match self.loader.load(model_id).await {
                    Ok(detector) => {
                        info!(model_id, "detection model ready");
                        Ok(Arc::new(detector))
                    }
                    Err(err) => {
                        warn!(model_id, error = %err, "detection model failed to load");
                        Err(err)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(detector))
    }
}
