use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::config::ThumbnailConfig;
use crate::models::{MediaEntry, Thumbnail};
use crate::utils::{AppError, AppResult};

/// Computes the image shown next to an entry.
///
/// Runs on a blocking thread. Returning `None` means "no image", which is not
/// an error for the caller.
pub trait ThumbnailGenerator: Send + Sync {
    fn generate(&self, entry: &MediaEntry) -> Option<Thumbnail>;
}

/// Uses a poster image stored next to the video (`movie.mkv` → `movie.jpg`)
#[derive(Debug, Clone)]
pub struct PosterThumbnailer {
    width: u32,
    height: u32,
    extensions: Vec<String>,
}

impl PosterThumbnailer {
    pub fn new(width: u32, height: u32, extensions: Vec<String>) -> Self {
        Self {
            width,
            height,
            extensions,
        }
    }

    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self::new(config.width, config.height, config.poster_extensions.clone())
    }

    fn find_poster(&self, video: &Path) -> Option<PathBuf> {
        self.extensions
            .iter()
            .map(|ext| video.with_extension(ext))
            .find(|candidate| candidate.is_file())
    }

    fn render(&self, entry: &MediaEntry) -> AppResult<Thumbnail> {
        let video = entry.location.to_path();
        let poster = self.find_poster(&video).ok_or_else(|| AppError::Thumbnail {
            location: entry.location.clone(),
            reason: "no poster image found".to_string(),
        })?;

        trace!("Decoding poster {:?}", poster);
        let img = image::open(&poster)?;
        let scaled = img.thumbnail(self.width, self.height);
        Ok(Thumbnail::new(scaled.to_rgba8()))
    }
}

impl ThumbnailGenerator for PosterThumbnailer {
    fn generate(&self, entry: &MediaEntry) -> Option<Thumbnail> {
        match self.render(entry) {
            Ok(thumbnail) => Some(thumbnail),
            Err(e) => {
                debug!("No thumbnail for {}: {}", entry.location, e);
                None
            }
        }
    }
}
