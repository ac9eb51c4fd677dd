mod identifiers;

pub use identifiers::{HandlerId, MediaLocation};

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Video,
    Audio,
}

/// Decoded thumbnail pixels, cheap to clone
#[derive(Clone)]
pub struct Thumbnail {
    image: Arc<RgbaImage>,
}

impl Thumbnail {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl PartialEq for Thumbnail {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
            || (self.image.dimensions() == other.image.dimensions()
                && self.image.as_raw() == other.image.as_raw())
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// One media item as known to the catalog and shown in a list
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEntry {
    pub location: MediaLocation,
    pub title: String,
    pub media_type: MediaType,
    pub length: Duration,
    pub modified: Option<DateTime<Utc>>,
    pub thumbnail: Option<Thumbnail>,
}

impl MediaEntry {
    pub fn new(location: impl Into<MediaLocation>, title: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            location: location.into(),
            title: title.into(),
            media_type,
            length: Duration::ZERO,
            modified: None,
            thumbnail: None,
        }
    }

    pub fn video(location: impl Into<MediaLocation>, title: impl Into<String>) -> Self {
        Self::new(location, title, MediaType::Video)
    }

    pub fn with_length(mut self, length: Duration) -> Self {
        self.length = length;
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Thumbnail) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }
}
