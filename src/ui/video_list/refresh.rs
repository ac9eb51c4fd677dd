use std::sync::Arc;
use tracing::{debug, info};

use super::display_list::DisplayList;
use super::presenter::Presenter;
use crate::models::MediaType;
use crate::services::CatalogSource;
use crate::utils::AppResult;
use crate::workers::ThumbnailQueue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub rows: usize,
    pub enqueued: usize,
}

/// Rebuilds a list from the catalog and queues the missing thumbnails
pub struct RefreshCoordinator {
    catalog: Arc<dyn CatalogSource>,
    queue: ThumbnailQueue,
    media_type: MediaType,
}

impl RefreshCoordinator {
    pub fn new(catalog: Arc<dyn CatalogSource>, queue: ThumbnailQueue, media_type: MediaType) -> Self {
        Self {
            catalog,
            queue,
            media_type,
        }
    }

    /// Refetch everything, rebuild `list`, queue jobs for entries without a
    /// thumbnail, then sort. An empty catalog shows the empty state and is
    /// not an error.
    pub fn refresh(&self, list: &mut DisplayList, presenter: &mut dyn Presenter) -> AppResult<RefreshOutcome> {
        let entries = self.catalog.items_by_type(self.media_type)?;
        debug!("Catalog returned {} entries", entries.len());

        let rows = list.rebuild(entries);
        if rows == 0 {
            info!("Catalog is empty");
            presenter.show_empty();
            return Ok(RefreshOutcome::default());
        }

        let enqueued = list
            .entries()
            .filter(|entry| self.queue.enqueue(entry))
            .count();
        list.sort();
        presenter.show_rows(list.rows());

        info!("Refreshed list: {} rows, {} thumbnail jobs queued", rows, enqueued);
        Ok(RefreshOutcome { rows, enqueued })
    }
}
