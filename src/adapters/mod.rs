// Adapters layer: concrete implementations for external systems (model storage, http).

pub mod http;
pub mod storage;

pub use storage::LocalModelStore;
