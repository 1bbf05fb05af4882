//! Single-flight content resolution cache.
//!
//! Wraps an asynchronous transform with per-key memoization: the persistent
//! store is consulted first, then an in-process pending map deduplicates
//! concurrent callers for the same key onto one shared computation. A
//! resolved value never changes once observed.
//!
//! Failures degrade: a failed transform resolves every waiter to the original
//! raw content and evicts the pending entry, so a later call for the same key
//! retries instead of being permanently stuck with the degraded result.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::Shared;

use crate::error::Result;
use crate::store::ContentStore;

type ResolutionFuture = Shared<Pin<Box<dyn Future<Output = Outcome> + Send>>>;

/// How a shared flight ended. Every waiter of the same flight observes the
/// identical outcome.
#[derive(Clone)]
enum Outcome {
    Resolved(String),
    Degraded(String),
}

/// Per-key single-flight memoization over an async transform.
///
/// One instance is created per process/activation and injected wherever
/// resolution happens; entries live for the lifetime of the instance.
///
/// # Example
///
/// ```
/// use content_rewriter::{MemoryStore, ResolutionCache};
///
/// # async fn example() {
/// let cache = ResolutionCache::new(MemoryStore::new());
/// let resolved = cache
///     .resolve("post-1", "<p>raw</p>", |raw| async move {
///         Ok(raw.replace("raw", "processed"))
///     })
///     .await;
/// assert_eq!(resolved, "<p>processed</p>");
/// # }
/// ```
pub struct ResolutionCache<S: ContentStore> {
    store: S,
    pending: Mutex<HashMap<String, ResolutionFuture>>,
}

impl<S: ContentStore> ResolutionCache<S> {
    /// Create a cache backed by the given persistent store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying persistent store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `raw` through `transform`, deduplicated and memoized by `key`.
    ///
    /// An empty `key` short-circuits to `raw`: content without an
    /// identifiable key cannot be deduplicated, so it is returned unchanged
    /// and uncached. Otherwise the persistent store is consulted, then the
    /// pending map; only when both miss does `transform` run -- registered
    /// under the key before it can be polled, so two concurrent first-callers
    /// can never both start it.
    ///
    /// Never fails: a transform error is logged and every waiter receives the
    /// original `raw` for this call.
    pub async fn resolve<F, Fut>(&self, key: &str, raw: &str, transform: F) -> String
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        if key.is_empty() {
            tracing::debug!("Content has no key, skipping resolution cache");
            return raw.to_string();
        }

        match self.store.lookup(key).await {
            Ok(Some(value)) => {
                tracing::debug!("Store hit for {key}");
                return value;
            }
            Ok(None) => {}
            // A broken store degrades to recomputing.
            Err(e) => tracing::warn!("Store lookup failed for {key}: {e}"),
        }

        // Check-then-insert under one lock, with no suspension point: the
        // flight is registered before any caller can poll it.
        let (flight, registered) = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = pending.get(key) {
                tracing::debug!("Joining in-flight resolution for {key}");
                (existing.clone(), false)
            } else {
                tracing::debug!("Starting resolution for {key}");
                let flight = Self::start_flight(key, raw, transform);
                pending.insert(key.to_string(), flight.clone());
                (flight, true)
            }
        };

        match flight.await {
            Outcome::Resolved(value) => {
                if registered {
                    if let Err(e) = self.store.persist(key, &value).await {
                        tracing::warn!("Failed to persist resolution for {key}: {e}");
                    }
                }
                value
            }
            Outcome::Degraded(value) => {
                if registered {
                    // Evict the failed flight so the next call retries.
                    self.pending
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(key);
                }
                value
            }
        }
    }

    fn start_flight<F, Fut>(key: &str, raw: &str, transform: F) -> ResolutionFuture
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let raw = raw.to_string();
        let key = key.to_string();
        let fut = transform(raw.clone());

        async move {
            match fut.await {
                Ok(value) => Outcome::Resolved(value),
                Err(e) => {
                    tracing::error!("Transform failed for {key}: {e}, returning raw content");
                    Outcome::Degraded(raw)
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn empty_key_bypasses_cache() {
        let cache = ResolutionCache::new(MemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolved = cache
            .resolve("", "<p>raw</p>", move |raw| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(raw)
            })
            .await;
        assert_eq!(resolved, "<p>raw</p>");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.store().is_empty());
    }

    #[tokio::test]
    async fn successful_resolution_is_persisted() {
        let cache = ResolutionCache::new(MemoryStore::new());
        let resolved = cache
            .resolve("post-1", "raw", |raw| async move { Ok(format!("[{raw}]")) })
            .await;
        assert_eq!(resolved, "[raw]");
        assert_eq!(
            cache.store().lookup("post-1").await.unwrap().as_deref(),
            Some("[raw]")
        );
    }

    #[tokio::test]
    async fn store_hit_short_circuits() {
        let store = MemoryStore::new();
        store.persist("post-1", "cached").await.unwrap();

        let cache = ResolutionCache::new(store);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolved = cache
            .resolve("post-1", "raw", move |raw| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(raw)
            })
            .await;
        assert_eq!(resolved, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
