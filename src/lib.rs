pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::TomlConfig;

pub use adapters::{http::router, LocalModelStore};
pub use core::{
    artifact::ProbabilityModel,
    model_handle::ModelHandle,
    scorer::{LabelPolicy, Scorer},
};
pub use utils::error::{Result, SurvivalError};
