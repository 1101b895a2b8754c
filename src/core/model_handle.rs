use crate::core::artifact::ProbabilityModel;
use crate::domain::ports::{ModelProvider, ModelStore, Predictor};
use crate::utils::error::{Result, SurvivalError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

/// Process-wide model handle: loaded once, then shared read-only.
///
/// Concurrent first callers wait on the same initialization. A failed load
/// leaves the cell empty so the next caller tries again.
pub struct ModelHandle<S: ModelStore> {
    store: S,
    cell: OnceCell<Arc<ProbabilityModel>>,
}

impl<S: ModelStore> ModelHandle<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<ProbabilityModel>> {
        self.cell
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    async fn load(&self) -> Result<Arc<ProbabilityModel>> {
        let started = Instant::now();
        let location = self.store.location();
        tracing::info!("📦 Loading model artifact from {}", location);

        let bytes = self
            .store
            .read_artifact()
            .await
            .map_err(|e| SurvivalError::ModelLoadError {
                path: location.clone(),
                message: e.to_string(),
            })?;
        let model = ProbabilityModel::from_json_slice(&bytes)?;

        tracing::info!(
            "✅ Model loaded ({}, {} bytes) in {:?}",
            model.kind(),
            bytes.len(),
            started.elapsed()
        );
        Ok(Arc::new(model))
    }
}

#[async_trait]
impl<S: ModelStore> ModelProvider for ModelHandle<S> {
    async fn model(&self) -> Result<Arc<dyn Predictor>> {
        let model: Arc<dyn Predictor> = self.get().await?;
        Ok(model)
    }
}
