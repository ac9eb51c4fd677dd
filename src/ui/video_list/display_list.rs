use std::time::Duration;
use tracing::{debug, trace};

use super::types::{SortBy, SortOrder};
use crate::models::{MediaEntry, MediaLocation, MediaType};

/// One row of the list: the entry plus display-only state
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRow {
    pub entry: MediaEntry,
    /// Playback position shown when this row is the last played media
    pub last_played: Option<Duration>,
    seq: u64,
}

impl VideoRow {
    pub fn location(&self) -> &MediaLocation {
        &self.entry.location
    }

    pub fn is_highlighted(&self) -> bool {
        self.last_played.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LastMedia {
    location: MediaLocation,
    time: Duration,
}

/// Result of applying a single-item update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Thumbnail applied in place at this index, order unchanged
    Replaced(usize),
    /// No row with that identity; the update was dropped
    Missing,
}

/// Sorted list of entries, owned by the display thread
#[derive(Debug, Clone)]
pub struct DisplayList {
    rows: Vec<VideoRow>,
    media_type: MediaType,
    sort_by: SortBy,
    sort_order: SortOrder,
    last_media: Option<LastMedia>,
    next_seq: u64,
}

impl DisplayList {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            rows: Vec::new(),
            media_type,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            last_media: None,
            next_seq: 0,
        }
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn rows(&self) -> &[VideoRow] {
        &self.rows
    }

    pub fn entries(&self) -> impl Iterator<Item = &MediaEntry> {
        self.rows.iter().map(|row| &row.entry)
    }

    pub fn get(&self, index: usize) -> Option<&VideoRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, location: &MediaLocation) -> Option<usize> {
        self.rows.iter().position(|row| row.location() == location)
    }

    pub fn sort_key(&self) -> SortBy {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.next_seq = 0;
    }

    /// Add an entry if it has the list's media type. Does not sort.
    pub fn add(&mut self, entry: MediaEntry) -> bool {
        if entry.media_type != self.media_type {
            trace!("Skipping {} ({:?})", entry.location, entry.media_type);
            return false;
        }

        let last_played = self
            .last_media
            .as_ref()
            .filter(|last| last.location == entry.location)
            .map(|last| last.time);

        self.rows.push(VideoRow {
            entry,
            last_played,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Clear, then add every entry of the matching type. Returns the row count.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = MediaEntry>) -> usize {
        self.clear();
        for entry in entries {
            self.add(entry);
        }
        self.rows.len()
    }

    /// Give the row with the same identity as `entry` its computed thumbnail.
    ///
    /// Only the thumbnail is taken from `entry`: the rest of it is the copy
    /// made when the job was queued and may be older than the row. No sort
    /// key depends on the thumbnail, so the order is unchanged.
    pub fn apply_update(&mut self, entry: MediaEntry) -> UpdateOutcome {
        let Some(index) = self.position(&entry.location) else {
            debug!("Dropping update for {}: no longer listed", entry.location);
            return UpdateOutcome::Missing;
        };

        if let Some(thumbnail) = entry.thumbnail {
            self.rows[index].entry.thumbnail = Some(thumbnail);
        }
        UpdateOutcome::Replaced(index)
    }

    /// Select a sort key; selecting the active key again flips the direction
    pub fn sort_by(&mut self, sort_by: SortBy) {
        if self.sort_by == sort_by {
            self.sort_order = self.sort_order.reversed();
        } else {
            self.sort_by = sort_by;
            self.sort_order = SortOrder::Ascending;
        }
        debug!("Sorting by {:?} ({:?})", self.sort_by, self.sort_order);
        self.sort();
    }

    /// Stable sort on the current key; ties keep insertion order
    pub fn sort(&mut self) {
        let sort_by = self.sort_by;
        let sort_order = self.sort_order;
        self.rows.sort_by(|a, b| {
            sort_order
                .apply(sort_by.compare(&a.entry, &b.entry))
                .then(a.seq.cmp(&b.seq))
        });
    }

    /// Mark `location` as last played at `time`, clearing any previous mark.
    /// The mark is re-applied when the row comes back after a rebuild.
    pub fn highlight(&mut self, location: &MediaLocation, time: Duration) -> bool {
        self.last_media = Some(LastMedia {
            location: location.clone(),
            time,
        });

        let mut found = false;
        for row in &mut self.rows {
            if row.location() == location {
                row.last_played = Some(time);
                found = true;
            } else {
                row.last_played = None;
            }
        }
        found
    }

    pub fn highlighted(&self) -> Option<&VideoRow> {
        self.rows.iter().find(|row| row.is_highlighted())
    }
}
