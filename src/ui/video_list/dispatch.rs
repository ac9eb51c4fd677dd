//! Worker → display thread conduit.
//!
//! Two kinds of message share one channel: a single-item update coming from
//! the thumbnail worker, and a catalog-changed notification coming from the
//! catalog. The display loop drains them one at a time.
//!
//! Updates travel with a rendezvous. The worker hands the entry over with
//! [`ListSender::request_update`] and then waits on the returned
//! [`UpdateReceipt`]; the display side applies the entry and calls
//! [`Arrival::arrive`]. Only one update can be pending at a time: a second
//! request while the slot is occupied is rejected with
//! [`AppError::UpdateInFlight`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::models::{MediaEntry, MediaLocation};
use crate::utils::{AppError, AppResult};

#[derive(Debug)]
pub enum ListMessage {
    /// A freshly processed entry waiting to be applied
    UpdateItem(PendingUpdate),
    /// The catalog contents changed; rebuild from scratch
    CatalogChanged,
}

/// Create a connected sender/receiver pair
pub fn channel() -> (ListSender, ListReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ListSender {
            tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        },
        ListReceiver { rx },
    )
}

#[derive(Debug, Clone)]
pub struct ListSender {
    tx: mpsc::UnboundedSender<ListMessage>,
    in_flight: Arc<AtomicUsize>,
}

impl ListSender {
    /// Fill the pending update slot with `entry` and post it to the display thread.
    ///
    /// The caller must wait on the returned receipt before requesting another
    /// update.
    pub fn request_update(&self, entry: MediaEntry) -> AppResult<UpdateReceipt> {
        if self
            .in_flight
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AppError::UpdateInFlight(entry.location));
        }

        let slot = SlotGuard(Arc::clone(&self.in_flight));
        let (ack, ack_rx) = oneshot::channel();
        let location = entry.location.clone();

        trace!("Posting update for {}", location);
        // On failure the message is dropped here, which frees the slot again
        self.tx
            .send(ListMessage::UpdateItem(PendingUpdate {
                entry,
                arrival: Arrival { slot, ack },
            }))
            .map_err(|_| AppError::DispatchClosed)?;

        Ok(UpdateReceipt {
            location,
            ack: ack_rx,
        })
    }

    pub fn notify_catalog_changed(&self) -> AppResult<()> {
        self.tx
            .send(ListMessage::CatalogChanged)
            .map_err(|_| AppError::DispatchClosed)
    }

    /// Number of updates posted but not yet applied (0 or 1)
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct ListReceiver {
    rx: mpsc::UnboundedReceiver<ListMessage>,
}

impl ListReceiver {
    pub async fn recv(&mut self) -> Option<ListMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ListMessage> {
        self.rx.try_recv().ok()
    }
}

/// Content of the single pending update slot
#[derive(Debug)]
pub struct PendingUpdate {
    entry: MediaEntry,
    arrival: Arrival,
}

impl PendingUpdate {
    pub fn entry(&self) -> &MediaEntry {
        &self.entry
    }

    pub fn into_parts(self) -> (MediaEntry, Arrival) {
        (self.entry, self.arrival)
    }
}

/// Display-side half of the rendezvous.
///
/// Dropping it without calling [`Arrival::arrive`] breaks the rendezvous and
/// the waiting worker observes [`AppError::RendezvousBroken`].
#[derive(Debug)]
pub struct Arrival {
    // Declared before `ack` so an implicit drop frees the slot first
    slot: SlotGuard,
    ack: oneshot::Sender<()>,
}

impl Arrival {
    /// Release the worker. The slot is freed before the worker wakes up.
    pub fn arrive(self) {
        let Arrival { slot, ack } = self;
        drop(slot);
        // The worker may already be gone after a shutdown
        let _ = ack.send(());
    }
}

/// Worker-side half of the rendezvous
#[derive(Debug)]
pub struct UpdateReceipt {
    location: MediaLocation,
    ack: oneshot::Receiver<()>,
}

impl UpdateReceipt {
    pub fn location(&self) -> &MediaLocation {
        &self.location
    }

    /// Block until the display thread has applied the update, or until
    /// `shutdown` fires.
    pub async fn wait(self, shutdown: &CancellationToken) -> AppResult<()> {
        let UpdateReceipt { location, ack } = self;
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(AppError::Cancelled),
            result = ack => result.map_err(|_| AppError::RendezvousBroken(location)),
        }
    }
}

#[derive(Debug)]
struct SlotGuard(Arc<AtomicUsize>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
