use crate::domain::ports::ModelStore;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Reads the model artifact from the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalModelStore {
    path: PathBuf,
}

impl LocalModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelStore for LocalModelStore {
    async fn read_artifact(&self) -> Result<Vec<u8>> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(data)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
