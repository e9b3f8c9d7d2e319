use std::{fmt, sync::Arc, time::Instant};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::types::{ComputeEngine, EngineInitError};

type EngineLoader =
    Arc<dyn Fn() -> Result<Arc<dyn ComputeEngine>, EngineInitError> + Send + Sync>;

/// Process-wide readiness barrier for the render engine.
///
/// Every handler awaits [`EngineGate::ready`] before touching the engine. The
/// loader runs on the blocking pool at most once per successful
/// initialisation; concurrent waiters share that single run. A failed load
/// leaves the gate empty so the next request tries again.
#[derive(Clone)]
pub struct EngineGate {
    cell: Arc<OnceCell<Arc<dyn ComputeEngine>>>,
    loader: EngineLoader,
}

impl EngineGate {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ComputeEngine>, EngineInitError> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            loader: Arc::new(loader),
        }
    }

    /// Gate that is already open, for callers that built the engine themselves.
    pub fn ready_with(engine: Arc<dyn ComputeEngine>) -> Self {
        let preset = Arc::clone(&engine);
        Self {
            cell: Arc::new(OnceCell::new_with(Some(engine))),
            loader: Arc::new(move || Ok(Arc::clone(&preset))),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn ready(&self) -> Result<Arc<dyn ComputeEngine>, EngineInitError> {
        let engine = self
            .cell
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                let started_at = Instant::now();
                let loaded = tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|err| EngineInitError::Aborted(err.to_string()))?;

                match loaded {
                    Ok(engine) => {
                        info!(
                            target = "syntect_edge::engine",
                            elapsed_ms = started_at.elapsed().as_millis() as u64,
                            "render engine ready"
                        );
                        Ok(engine)
                    }
                    Err(err) => {
                        warn!(
                            target = "syntect_edge::engine",
                            error = %err,
                            "render engine failed to initialise"
                        );
                        Err(err)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(engine))
    }
}

impl fmt::Debug for EngineGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineGate")
            .field("ready", &self.is_ready())
            .finish()
    }
}
