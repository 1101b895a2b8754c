pub mod artifact;
pub mod encoder;
pub mod model_handle;
pub mod scorer;

pub use crate::domain::model::{FeatureVector, PassengerAttributes, SurvivalProbability};
pub use crate::domain::ports::{ConfigProvider, ModelProvider, ModelStore, Predictor};
pub use crate::utils::error::Result;
