//! In-memory implementation of the `AttachmentStore` port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::attachment::{
    domain::AttachmentDescriptor,
    ports::{AttachmentStore, AttachmentStoreError, AttachmentStoreResult, UploadRequest},
};

/// In-memory implementation of [`AttachmentStore`].
///
/// Uploaded files are served from `memory://attachments/<uuid>/<file name>`
/// URLs. Download calls are counted so tests can observe cache behaviour.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttachmentStore {
    objects: Arc<RwLock<HashMap<String, Arc<[u8]>>>>,
    downloads: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryAttachmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many downloads reached this store.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Simulates loss (`false`) or recovery (`true`) of the backing service.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> AttachmentStoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AttachmentStoreError::Unavailable(
                "in-memory attachment store offline".to_owned(),
            ));
        }
        Ok(())
    }
}

fn lock_error(err: impl std::fmt::Display) -> AttachmentStoreError {
    AttachmentStoreError::Unavailable(format!("lock poisoned: {err}"))
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn upload(&self, request: UploadRequest) -> AttachmentStoreResult<AttachmentDescriptor> {
        self.ensure_available()?;
        if request.data.is_empty() {
            return Err(AttachmentStoreError::Rejected(format!(
                "{} has no content",
                request.file_name
            )));
        }

        let url = format!("memory://attachments/{}/{}", Uuid::new_v4(), request.file_name);
        let byte_size = u64::try_from(request.data.len())
            .map_err(|err| AttachmentStoreError::Rejected(err.to_string()))?;
        let mut descriptor =
            AttachmentDescriptor::new(request.kind(), url.clone(), &request.mime_type, byte_size);
        if let Some((width, height)) = request.dimensions {
            descriptor = descriptor.with_dimensions(width, height);
        }
        if let Some(duration_ms) = request.duration_ms {
            descriptor = descriptor.with_duration_ms(duration_ms);
        }

        let mut objects = self.objects.write().map_err(lock_error)?;
        objects.insert(url, Arc::from(request.data));
        Ok(descriptor)
    }

    async fn download(&self, url: &str) -> AttachmentStoreResult<Arc<[u8]>> {
        self.ensure_available()?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.read().map_err(lock_error)?;
        objects
            .get(url)
            .cloned()
            .ok_or_else(|| AttachmentStoreError::NotFound(url.to_owned()))
    }
}
