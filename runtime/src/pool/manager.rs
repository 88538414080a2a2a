//! Pool manager for browser rendering contexts.
//!
//! Bounds how many contexts are alive at once (the worker count) and makes
//! sure every context handed out is closed again, whichever way the task
//! holding it exits.

use crate::error::RenderError;
use crate::renderer::{RenderContext, Renderer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

/// A context borrowed from the pool, owned by exactly one task.
///
/// Prefer [`ContextHandle::release`]. If the handle is dropped instead (early
/// return, error, panic unwinding) the close is spawned on the runtime the
/// handle was acquired on.
pub struct ContextHandle {
    context: Option<Box<dyn RenderContext>>,
    label: String,
    runtime: tokio::runtime::Handle,
    active_count: Arc<AtomicUsize>,
    _permit: OwnedSemaphorePermit,
}

impl ContextHandle {
    /// Mutable access to the render context.
    pub fn context_mut(&mut self) -> &mut dyn RenderContext {
        match self.context.as_deref_mut() {
            Some(ctx) => ctx,
            None => unreachable!("context is only taken by release or drop"),
        }
    }

    /// Close the context and give the slot back.
    pub async fn release(mut self) {
        if let Some(context) = self.context.take() {
            if let Err(e) = context.close().await {
                warn!("closing context for {}: {e}", self.label);
            }
        }
    }
}

impl Drop for ContextHandle {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        if let Some(context) = self.context.take() {
            let label = std::mem::take(&mut self.label);
            debug!("context for {label} dropped without release, closing in background");
            self.runtime.spawn(async move {
                if let Err(e) = context.close().await {
                    warn!("background close for {label}: {e}");
                }
            });
        }
    }
}

/// Hands out at most `max_contexts` live contexts at a time.
pub struct PoolManager {
    renderer: Arc<dyn Renderer>,
    semaphore: Arc<Semaphore>,
    max_contexts: usize,
    active_count: Arc<AtomicUsize>,
}

impl PoolManager {
    /// Create a pool. A size below 1 is raised to 1.
    pub fn new(renderer: Arc<dyn Renderer>, max_contexts: usize) -> Self {
        let max_contexts = max_contexts.max(1);
        Self {
            renderer,
            semaphore: Arc::new(Semaphore::new(max_contexts)),
            max_contexts,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Acquire a fresh context, waiting while the pool is full.
    ///
    /// `label` names the task in teardown logs (URL or slug).
    pub async fn acquire(&self, label: &str) -> Result<ContextHandle, RenderError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| RenderError::Browser(format!("pool closed: {e}")))?;

        let context = self.renderer.new_context().await?;
        self.active_count.fetch_add(1, Ordering::SeqCst);

        Ok(ContextHandle {
            context: Some(context),
            label: label.to_string(),
            runtime: tokio::runtime::Handle::current(),
            active_count: Arc::clone(&self.active_count),
            _permit: permit,
        })
    }

    /// Number of contexts currently checked out.
    pub fn active(&self) -> usize {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Maximum concurrent contexts.
    pub fn max_contexts(&self) -> usize {
        self.max_contexts
    }

    /// Slots free right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_pool_size_floor() {
        let renderer = Arc::new(SnapshotRenderer::new(HashMap::new()));
        let pool = PoolManager::new(renderer, 0);
        assert_eq!(pool.max_contexts(), 1);
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let renderer = Arc::new(SnapshotRenderer::new(HashMap::new()));
        let pool = PoolManager::new(renderer.clone(), 2);

        let a = pool.acquire("a").await.unwrap();
        let b = pool.acquire("b").await.unwrap();
        assert_eq!(pool.active(), 2);
        assert_eq!(pool.available(), 0);

        a.release().await;
        assert_eq!(pool.active(), 1);
        assert_eq!(pool.available(), 1);

        drop(b);
        assert_eq!(pool.active(), 0);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_dropped_handle_closes_context() {
        let renderer = Arc::new(SnapshotRenderer::new(HashMap::new()));
        let pool = PoolManager::new(renderer.clone(), 1);

        let handle = pool.acquire("dropped").await.unwrap();
        assert_eq!(renderer.open_contexts(), 1);
        drop(handle);
        // Close runs on a spawned task.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(renderer.open_contexts(), 0);
    }
}
