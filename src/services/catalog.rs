use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::constants::VIDEO_EXTENSIONS;
use crate::models::{HandlerId, MediaEntry, MediaLocation, MediaType, Thumbnail};
use crate::ui::video_list::ListSender;
use crate::utils::{AppError, AppResult};

/// Authoritative store of media entries
pub trait CatalogSource: Send + Sync {
    /// Every entry of the given type, in catalog order
    fn items_by_type(&self, media_type: MediaType) -> AppResult<Vec<MediaEntry>>;

    /// Whether the master copy of an entry already carries a thumbnail
    fn has_thumbnail(&self, location: &MediaLocation) -> bool;

    /// Persist a computed thumbnail on the master copy of an entry
    fn store_thumbnail(&self, location: &MediaLocation, thumbnail: Thumbnail) -> AppResult<()>;

    /// Register a list to be told when the catalog contents change
    fn add_update_handler(&self, id: HandlerId, sender: ListSender);

    fn remove_update_handler(&self, id: &HandlerId);
}

/// Thread-safe in-memory catalog
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: RwLock<Vec<MediaEntry>>,
    handlers: Mutex<HashMap<HandlerId, ListSender>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<MediaEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the whole catalog and notify handlers
    pub fn replace_all(&self, entries: Vec<MediaEntry>) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = entries;
        self.notify_changed();
    }

    /// Insert or replace an entry by location and notify handlers
    pub fn upsert(&self, entry: MediaEntry) {
        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            match entries.iter_mut().find(|existing| existing.location == entry.location) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        self.notify_changed();
    }

    pub fn remove(&self, location: &MediaLocation) -> bool {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let before = entries.len();
            entries.retain(|entry| &entry.location != location);
            entries.len() != before
        };
        if removed {
            self.notify_changed();
        }
        removed
    }

    pub fn get(&self, location: &MediaLocation) -> Option<MediaEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|entry| &entry.location == location)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Post a catalog-changed message to every registered handler.
    /// Handlers whose list has gone away are dropped.
    pub fn notify_changed(&self) {
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.retain(|id, sender| match sender.notify_catalog_changed() {
            Ok(()) => true,
            Err(e) => {
                warn!("Removing update handler '{}': {}", id, e);
                false
            }
        });
        debug!("Notified {} update handlers", handlers.len());
    }

    /// Add every video file directly inside `dir`. Returns how many were found.
    pub fn scan_directory(&self, dir: &Path) -> AppResult<usize> {
        info!("Scanning {:?} for videos", dir);

        let mut found = Vec::new();
        for dir_entry in std::fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if !path.is_file() || !is_video_file(&path) {
                continue;
            }

            let title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());

            let mut entry = MediaEntry::video(MediaLocation::from_path(&path), title);
            if let Ok(modified) = dir_entry.metadata().and_then(|meta| meta.modified()) {
                entry = entry.with_modified(DateTime::<Utc>::from(modified));
            }
            found.push(entry);
        }

        // read_dir order is platform dependent
        found.sort_by(|a, b| a.location.as_str().cmp(b.location.as_str()));
        let count = found.len();

        {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            for entry in found {
                if !entries.iter().any(|existing| existing.location == entry.location) {
                    entries.push(entry);
                }
            }
        }

        info!("Found {} videos in {:?}", count, dir);
        self.notify_changed();
        Ok(count)
    }
}

impl CatalogSource for MemoryCatalog {
    fn items_by_type(&self, media_type: MediaType) -> AppResult<Vec<MediaEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.media_type == media_type)
            .cloned()
            .collect())
    }

    fn has_thumbnail(&self, location: &MediaLocation) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| &entry.location == location && entry.has_thumbnail())
    }

    fn store_thumbnail(&self, location: &MediaLocation, thumbnail: Thumbnail) -> AppResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .iter_mut()
            .find(|entry| &entry.location == location)
            .ok_or_else(|| AppError::Catalog(format!("unknown media {}", location)))?;
        entry.thumbnail = Some(thumbnail);
        Ok(())
    }

    fn add_update_handler(&self, id: HandlerId, sender: ListSender) {
        debug!("Update handler '{}' registered", id);
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
    }

    fn remove_update_handler(&self, id: &HandlerId) {
        debug!("Update handler '{}' removed", id);
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|valid| valid.eq_ignore_ascii_case(&ext)))
}
