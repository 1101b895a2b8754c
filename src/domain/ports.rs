use crate::domain::model::FeatureVector;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Anything that turns a feature vector into a raw survival score.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

/// Source of the serialized model artifact.
pub trait ModelStore: Send + Sync {
    fn read_artifact(&self) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn location(&self) -> String;
}

/// Hands out the shared, read-only model for a request.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn model(&self) -> Result<Arc<dyn Predictor>>;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn allowed_origin(&self) -> &str;
    fn model_path(&self) -> &Path;
    fn preload_model(&self) -> bool;
    fn reject_unknown_labels(&self) -> bool;
}
