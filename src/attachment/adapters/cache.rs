//! Bounded download cache for attachment bytes.
//!
//! The cache is an explicit component: the host constructs one per process,
//! shares it through an [`Arc`], and calls [`AttachmentCache::shutdown`] when
//! tearing down. Entries are evicted oldest-first once `capacity` is reached.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::attachment::{
    domain::AttachmentDescriptor,
    ports::{AttachmentStore, AttachmentStoreResult, UploadRequest},
};
use crate::config::AttachmentCacheConfig;

/// Bounded, insertion-ordered cache of downloaded attachments keyed by URL.
///
/// # Examples
///
/// ```
/// use colloquy::attachment::adapters::cache::AttachmentCache;
/// use std::sync::Arc;
///
/// let cache = AttachmentCache::new(1);
/// cache.insert("a", Arc::from(vec![1_u8]));
/// let evicted = cache.insert("b", Arc::from(vec![2_u8]));
/// assert_eq!(evicted.as_deref(), Some("a"));
/// assert!(cache.get("a").is_none());
/// ```
#[derive(Debug)]
pub struct AttachmentCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Arc<[u8]>>,
    order: VecDeque<String>,
    shut_down: bool,
}

impl AttachmentCache {
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Creates a cache sized from configuration.
    #[must_use]
    pub fn from_config(config: &AttachmentCacheConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached bytes for `url`, if present.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().entries.get(url).cloned()
    }

    /// Caches `bytes` under `url`, returning the URL evicted to make room.
    ///
    /// Replacing an existing entry keeps its original age. Inserts after
    /// [`Self::shutdown`] are ignored.
    pub fn insert(&self, url: impl Into<String>, bytes: Arc<[u8]>) -> Option<String> {
        let key = url.into();
        let mut state = self.lock();
        if state.shut_down || self.capacity == 0 {
            return None;
        }
        if let Some(existing) = state.entries.get_mut(&key) {
            *existing = bytes;
            return None;
        }

        let mut evicted = None;
        if state.entries.len() >= self.capacity
            && let Some(oldest) = state.order.pop_front()
        {
            state.entries.remove(&oldest);
            evicted = Some(oldest);
        }
        state.order.push_back(key.clone());
        state.entries.insert(key, bytes);
        evicted
    }

    /// Drops every entry and stops caching for the rest of the process.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
        state.shut_down = true;
    }

    /// Returns `true` once [`Self::shutdown`] has run.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An [`AttachmentStore`] that serves repeated downloads from an
/// [`AttachmentCache`].
///
/// Uploads pass through and prime the cache with the uploaded bytes.
#[derive(Debug, Clone)]
pub struct CachedAttachmentStore<S>
where
    S: AttachmentStore,
{
    inner: Arc<S>,
    cache: Arc<AttachmentCache>,
}

impl<S> CachedAttachmentStore<S>
where
    S: AttachmentStore,
{
    /// Wraps `inner` with `cache`.
    #[must_use]
    pub const fn new(inner: Arc<S>, cache: Arc<AttachmentCache>) -> Self {
        Self { inner, cache }
    }

    /// Returns the shared cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<AttachmentCache> {
        &self.cache
    }
}

#[async_trait]
impl<S> AttachmentStore for CachedAttachmentStore<S>
where
    S: AttachmentStore,
{
    async fn upload(&self, request: UploadRequest) -> AttachmentStoreResult<AttachmentDescriptor> {
        let bytes: Arc<[u8]> = Arc::from(request.data.as_slice());
        let descriptor = self.inner.upload(request).await?;
        self.cache.insert(descriptor.url.clone(), bytes);
        Ok(descriptor)
    }

    async fn download(&self, url: &str) -> AttachmentStoreResult<Arc<[u8]>> {
        if let Some(bytes) = self.cache.get(url) {
            debug!(url, "attachment cache hit");
            return Ok(bytes);
        }
        let bytes = self.inner.download(url).await?;
        if let Some(evicted) = self.cache.insert(url, Arc::clone(&bytes)) {
            debug!(url, evicted = %evicted, "attachment cache evicted oldest entry");
        }
        Ok(bytes)
    }
}
