//! Video list page.
//!
//! [`VideoListView`] owns the [`DisplayList`] and is the only place it is
//! mutated. It runs on the display thread and reacts to [`ListMessage`]s
//! posted by the thumbnail worker and the catalog.

mod dispatch;
mod display_list;
mod presenter;
mod refresh;
mod types;

pub use dispatch::{Arrival, ListMessage, ListReceiver, ListSender, PendingUpdate, UpdateReceipt, channel};
pub use display_list::{DisplayList, UpdateOutcome, VideoRow};
pub use presenter::{LogPresenter, Presenter};
pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use types::{SortBy, SortOrder};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::{LastMediaConfig, ListConfig};
use crate::models::{HandlerId, MediaLocation, MediaType};
use crate::services::{CatalogSource, PlaybackControl};
use crate::utils::AppResult;
use crate::workers::ThumbnailQueue;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

pub struct VideoListView<P: Presenter> {
    id: HandlerId,
    list: DisplayList,
    presenter: P,
    refresher: RefreshCoordinator,
    catalog: Arc<dyn CatalogSource>,
    playback: Arc<dyn PlaybackControl>,
    queue: ThumbnailQueue,
    sender: ListSender,
    receiver: ListReceiver,
}

impl<P: Presenter> VideoListView<P> {
    /// Create the view and register it for catalog change notifications
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        queue: ThumbnailQueue,
        playback: Arc<dyn PlaybackControl>,
        presenter: P,
        settings: &ListConfig,
    ) -> Self {
        let id = HandlerId::new(format!(
            "video-list-{}",
            NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let (sender, receiver) = channel();
        catalog.add_update_handler(id.clone(), sender.clone());

        let list = DisplayList::new(MediaType::Video).with_sort(settings.sort_by, settings.sort_order());
        let refresher = RefreshCoordinator::new(Arc::clone(&catalog), queue.clone(), MediaType::Video);

        Self {
            id,
            list,
            presenter,
            refresher,
            catalog,
            playback,
            queue,
            sender,
            receiver,
        }
    }

    /// Sender to hand to the thumbnail worker
    pub fn sender(&self) -> ListSender {
        self.sender.clone()
    }

    pub fn id(&self) -> &HandlerId {
        &self.id
    }

    pub fn list(&self) -> &DisplayList {
        &self.list
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Seed the last-played highlight from persisted state and redraw
    pub fn activate(&mut self, last_media: &LastMediaConfig) {
        if let Some((location, time)) = last_media.last_played() {
            debug!("Highlighting last media {} at {:?}", location, time);
            self.list.highlight(&location, time);
        }
        if !self.list.is_empty() {
            self.presenter.show_rows(self.list.rows());
        }
    }

    pub fn refresh(&mut self) -> AppResult<RefreshOutcome> {
        self.refresher.refresh(&mut self.list, &mut self.presenter)
    }

    pub fn sort_by(&mut self, sort_by: SortBy) {
        self.list.sort_by(sort_by);
        self.presenter.show_rows(self.list.rows());
    }

    /// Location of the row at `index`, for the host's playback navigation.
    /// Stops running audio when a row is actually selected.
    pub fn select(&self, index: usize) -> Option<MediaLocation> {
        let location = self.list.get(index)?.location().clone();
        self.playback.stop_audio();
        debug!("Selected {}", location);
        Some(location)
    }

    pub fn handle_message(&mut self, message: ListMessage) {
        match message {
            ListMessage::UpdateItem(pending) => {
                let (entry, arrival) = pending.into_parts();
                match self.list.apply_update(entry) {
                    UpdateOutcome::Replaced(index) => {
                        if let Some(row) = self.list.get(index) {
                            self.presenter.row_updated(index, row);
                        }
                    }
                    UpdateOutcome::Missing => {}
                }
                arrival.arrive();
            }
            ListMessage::CatalogChanged => {
                if let Err(e) = self.refresh() {
                    error!("Failed to refresh video list: {}", e);
                }
            }
        }
    }

    /// Wait for and handle one message. Returns false if the channel closed.
    pub async fn next_message(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.handle_message(message);
                true
            }
            None => false,
        }
    }

    /// Handle every message already queued without waiting
    pub fn drain_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.receiver.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Event loop: handle messages until `shutdown` fires
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Video list '{}' running", self.id);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                handled = self.next_message() => {
                    if !handled {
                        break;
                    }
                }
            }
        }
        info!("Video list '{}' stopped", self.id);
    }

    /// Tear the view down: stop listening to the catalog, drop pending jobs
    /// and empty the list. Returns the presenter.
    pub fn destroy(mut self) -> P {
        self.catalog.remove_update_handler(&self.id);
        self.queue.clear();
        self.list.clear();
        // Queued updates are dropped unapplied; their worker sees a broken rendezvous
        while self.receiver.try_recv().is_some() {}
        self.presenter
    }
}
