use crate::domain::ports::RedirectStore;
use crate::domain::redirect::RedirectRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Durable redirect store backed by a single JSON file.
///
/// The host points this at a path that survives process death; a fresh store
/// over the same path sees the request persisted before the teardown.
pub struct FileRedirectStore {
    path: PathBuf,
}

impl FileRedirectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RedirectStore for FileRedirectStore {
    async fn save(&self, request: &RedirectRequest) -> Result<()> {
        let json = serde_json::to_vec_pretty(request)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<RedirectRequest>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
