//! In-memory registry of grayscale images.
//!
//! The store exclusively owns every buffer it holds. Images enter by move
//! ([`ImageStore::put`]) or by copy ([`ImageStore::put_raw`]) and leave as
//! independent clones ([`ImageStore::get`]), so nothing a caller does to a
//! returned buffer can reach stored state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GrayImage, ImageId, PipelineError};

/// Listing entry returned by [`ImageStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Identifier of the stored image.
    pub id: ImageId,
    /// Dimensions of the stored image.
    pub dimensions: Dimensions,
}

/// Registry mapping [`ImageId`]s to owned grayscale buffers.
///
/// Identifiers start at 1 and increase by one per insertion. They are
/// never reused, not even after [`clear`](Self::clear).
#[derive(Debug, Clone)]
pub struct ImageStore {
    images: BTreeMap<ImageId, GrayImage>,
    next_id: u64,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            images: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Take ownership of `image` and return its new identifier.
    pub fn put(&mut self, image: GrayImage) -> ImageId {
        let id = ImageId::new(self.next_id);
        self.next_id += 1;
        log::debug!(
            "store: put {id} ({}x{})",
            image.width(),
            image.height()
        );
        self.images.insert(id, image);
        id
    }

    /// Copy a raw row-major pixel slice into the store.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if either dimension is
    /// zero, or [`PipelineError::SizeMismatch`] if `pixels` does not hold
    /// exactly `width * height` bytes.
    pub fn put_raw(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<ImageId, PipelineError> {
        let dimensions = Dimensions::new(width, height);
        if dimensions.is_empty() {
            return Err(PipelineError::InvalidParameter(format!(
                "image dimensions must be positive, got {dimensions}"
            )));
        }
        let expected = dimensions.pixel_count();
        let actual = pixels.len() as u64;
        if actual != expected {
            return Err(PipelineError::SizeMismatch { expected, actual });
        }
        let image = GrayImage::from_raw(width, height, pixels.to_vec())
            .ok_or(PipelineError::SizeMismatch { expected, actual })?;
        Ok(self.put(image))
    }

    /// Return an independent copy of the image stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if `id` has no entry.
    pub fn get(&self, id: ImageId) -> Result<GrayImage, PipelineError> {
        self.images
            .get(&id)
            .cloned()
            .ok_or(PipelineError::NotFound(id))
    }

    /// Dimensions of the image stored under `id`, without copying pixels.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if `id` has no entry.
    pub fn dimensions(&self, id: ImageId) -> Result<Dimensions, PipelineError> {
        self.images
            .get(&id)
            .map(Dimensions::of)
            .ok_or(PipelineError::NotFound(id))
    }

    /// Returns `true` if `id` has an entry.
    #[must_use]
    pub fn contains(&self, id: ImageId) -> bool {
        self.images.contains_key(&id)
    }

    /// Remove and return the image stored under `id`, if any.
    pub fn remove(&mut self, id: ImageId) -> Option<GrayImage> {
        self.images.remove(&id)
    }

    /// Remove every image. The identifier counter keeps counting.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Snapshot of all entries in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<ImageEntry> {
        self.images
            .iter()
            .map(|(&id, image)| ImageEntry {
                id,
                dimensions: Dimensions::of(image),
            })
            .collect()
    }

    /// Number of stored images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if the store holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
