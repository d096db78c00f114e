use crate::domain::ports::RedirectStore;
use crate::domain::redirect::RedirectRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for the pending redirect request.
///
/// Clones share the same slot, so a "recreated" orchestrator handed a clone
/// sees what its predecessor persisted. Suited to tests and hosts that keep
/// the process alive across the redirect.
#[derive(Default, Clone)]
pub struct InMemoryRedirectStore {
    pending: Arc<RwLock<Option<RedirectRequest>>>,
}

impl InMemoryRedirectStore {
    /// Creates a new, empty in-memory redirect store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RedirectStore for InMemoryRedirectStore {
    async fn save(&self, request: &RedirectRequest) -> Result<()> {
        let mut pending = self.pending.write().await;
        *pending = Some(request.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<RedirectRequest>> {
        let pending = self.pending.read().await;
        Ok(pending.clone())
    }

    async fn clear(&self) -> Result<()> {
        let mut pending = self.pending.write().await;
        *pending = None;
        Ok(())
    }
}
