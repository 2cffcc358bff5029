//! The image list behind the create/edit form.
//!
//! Picked files are compressed as a batch, given a local preview and kept in
//! on-screen order next to images that are already stored (edit flow). On
//! submit the list turns into a [`SubmissionPayload`], which uploads the new
//! files and splices their URLs back in place.
//!
//! ## Preview lifecycle
//!
//! Every [`PreviewHandle`] the pipeline creates is released exactly once:
//! when its item is removed, or when the pipeline is reset or dropped.

use crate::imaging::{CompressError, CompressSettings, ImageBackend, compress_many};
use crate::naming::sanitize_filename;
use crate::spot::ValidationError;
use crate::store::{ObjectStore, UploadError};
use crate::types::ImageFile;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("画像の圧縮に失敗しました: {0}")]
    Compress(#[from] CompressError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// `position` is the 1-based on-screen position of the failed image.
    /// `uploaded` lists the URLs stored before the failure.
    #[error("画像{position}のアップロードに失敗しました: {source}")]
    Upload {
        position: usize,
        uploaded: Vec<String>,
        #[source]
        source: UploadError,
    },
}

/// A local, displayable reference to a picked file (an object URL in a
/// browser).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Creates and revokes preview handles.
pub trait PreviewStore {
    fn create(&self, file: &ImageFile) -> PreviewHandle;
    fn release(&self, handle: &PreviewHandle);
}

#[derive(Debug, Default)]
struct PreviewRegistry {
    live: HashSet<PreviewHandle>,
    created: usize,
    released: usize,
    /// Releases of handles that were not live.
    stray_releases: usize,
}

/// In-memory preview registry. Clones share the same registry, so a caller
/// can keep one to inspect what a pipeline created and released.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreviewStore {
    inner: Arc<Mutex<PreviewRegistry>>,
}

impl MemoryPreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, PreviewRegistry> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.registry().live.len()
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.registry().live.contains(handle)
    }

    pub fn created_count(&self) -> usize {
        self.registry().created
    }

    pub fn released_count(&self) -> usize {
        self.registry().released
    }

    pub fn stray_releases(&self) -> usize {
        self.registry().stray_releases
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, file: &ImageFile) -> PreviewHandle {
        let handle = PreviewHandle(format!("blob:local/{}", Uuid::new_v4()));
        let mut registry = self.registry();
        registry.live.insert(handle.clone());
        registry.created += 1;
        log::debug!("preview {} for {}", handle.as_str(), file.name);
        handle
    }

    fn release(&self, handle: &PreviewHandle) {
        let mut registry = self.registry();
        if registry.live.remove(handle) {
            registry.released += 1;
        } else {
            registry.stray_releases += 1;
            log::warn!("preview {} released twice or never created", handle.as_str());
        }
    }
}

/// A compressed file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageItem {
    Pending(PendingUpload),
    Persisted { url: String },
}

impl ImageItem {
    /// What the form shows as the thumbnail.
    pub fn display_url(&self) -> &str {
        match self {
            ImageItem::Pending(p) => p.preview.as_str(),
            ImageItem::Persisted { url } => url,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageItem::Pending(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Ordered image list of one form instance.
pub struct IngestPipeline<P: PreviewStore> {
    items: Vec<ImageItem>,
    previews: P,
    settings: CompressSettings,
}

impl<P: PreviewStore> IngestPipeline<P> {
    pub fn new(previews: P, settings: CompressSettings) -> Self {
        Self {
            items: Vec::new(),
            previews,
            settings,
        }
    }

    /// Start from an already stored spot's images.
    pub fn with_existing(
        previews: P,
        settings: CompressSettings,
        urls: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut pipeline = Self::new(previews, settings);
        pipeline.items = urls
            .into_iter()
            .map(|url| ImageItem::Persisted { url })
            .collect();
        pipeline
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compress `files` and append them in pick order.
    ///
    /// The batch is all-or-nothing: if any file fails to compress the list
    /// is left as it was. Returns the number of items appended.
    pub fn add_files(
        &mut self,
        backend: &impl ImageBackend,
        files: &[ImageFile],
    ) -> Result<usize, IngestError> {
        let compressed = compress_many(backend, files, &self.settings)?;
        let added = compressed.len();
        for c in compressed {
            let preview = self.previews.create(&c.file);
            self.items.push(ImageItem::Pending(PendingUpload {
                file: c.file,
                preview,
            }));
        }
        log::info!("added {} image(s), {} total", added, self.items.len());
        Ok(added)
    }

    /// Remove the item at `index`. Out-of-range indices are ignored.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if let ImageItem::Pending(p) = self.items.remove(index) {
            self.previews.release(&p.preview);
        }
        true
    }

    /// Swap the item at `index` with its neighbour. No-op at the ends.
    pub fn move_at(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1),
        };
        match target {
            Some(target) if index < self.items.len() && target < self.items.len() => {
                self.items.swap(index, target);
                true
            }
            _ => false,
        }
    }

    /// Drop every item, releasing all previews.
    pub fn reset(&mut self) {
        for item in self.items.drain(..) {
            if let ImageItem::Pending(p) = item {
                self.previews.release(&p.preview);
            }
        }
    }

    /// Snapshot the list for submission, in on-screen order.
    pub fn to_submission_payload(&self) -> Result<SubmissionPayload, IngestError> {
        if self.items.is_empty() {
            return Err(ValidationError::NoImages.into());
        }
        let slots = self
            .items
            .iter()
            .map(|item| match item {
                ImageItem::Persisted { url } => PayloadSlot::Existing(url.clone()),
                ImageItem::Pending(p) => PayloadSlot::Upload(NewUpload {
                    bytes: p.file.bytes.clone(),
                    filename: p.file.name.clone(),
                    content_type: p.file.content_type.clone(),
                }),
            })
            .collect();
        Ok(SubmissionPayload { slots })
    }
}

impl<P: PreviewStore> Drop for IngestPipeline<P> {
    fn drop(&mut self) {
        self.reset();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSlot {
    Existing(String),
    Upload(NewUpload),
}

/// Ordered mix of stored URLs and files still to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    pub slots: Vec<PayloadSlot>,
}

impl SubmissionPayload {
    pub fn upload_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, PayloadSlot::Upload(_)))
            .count()
    }

    /// Upload every new file and return the final URL list in on-screen
    /// order.
    ///
    /// The first failure stops the run. Objects stored before it stay in
    /// the store; their URLs are reported in [`IngestError::Upload`].
    pub fn upload(self, store: &impl ObjectStore) -> Result<Vec<String>, IngestError> {
        let total = self.upload_count();
        let mut uploaded = Vec::with_capacity(total);
        let mut urls = Vec::with_capacity(self.slots.len());

        for (i, slot) in self.slots.into_iter().enumerate() {
            match slot {
                PayloadSlot::Existing(url) => urls.push(url),
                PayloadSlot::Upload(new) => {
                    let filename = sanitize_filename(&new.filename);
                    log::info!(
                        "uploading {}/{}: {} ({} bytes)",
                        uploaded.len() + 1,
                        total,
                        filename,
                        new.bytes.len()
                    );
                    match store.put_object(&new.bytes, &filename, &new.content_type) {
                        Ok(url) => {
                            uploaded.push(url.clone());
                            urls.push(url);
                        }
                        Err(source) => {
                            log::error!("upload of image {} failed: {}", i + 1, source);
                            return Err(IngestError::Upload {
                                position: i + 1,
                                uploaded,
                                source,
                            });
                        }
                    }
                }
            }
        }
        Ok(urls)
    }
}
