use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::thumbnail_generator::ThumbnailGenerator;
use crate::models::{MediaEntry, MediaLocation};
use crate::services::CatalogSource;
use crate::ui::video_list::ListSender;
use crate::utils::AppError;

/// A request to compute the thumbnail of one entry
#[derive(Debug, Clone)]
pub struct Job {
    entry: MediaEntry,
    generation: u64,
}

impl Job {
    pub fn entry(&self) -> &MediaEntry {
        &self.entry
    }
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    /// Pending locations plus the one being processed
    queued: HashSet<MediaLocation>,
    /// Bumped by `clear()`; jobs from older generations are retired
    generation: u64,
    in_progress: Option<MediaLocation>,
}

#[derive(Debug, Default)]
struct QueueShared {
    state: Mutex<QueueState>,
    job_ready: Notify,
    idle: Notify,
    shutdown: CancellationToken,
}

/// Pending thumbnail jobs, shared between the display thread and the worker
#[derive(Debug, Clone, Default)]
pub struct ThumbnailQueue {
    shared: Arc<QueueShared>,
}

impl ThumbnailQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a job for `entry`. No-op if it already has a thumbnail, is already
    /// queued, or is the job being processed.
    pub fn enqueue(&self, entry: &MediaEntry) -> bool {
        if entry.has_thumbnail() {
            trace!("{} already has a thumbnail", entry.location);
            return false;
        }

        let mut state = self.lock();
        if !state.queued.insert(entry.location.clone()) {
            trace!("{} is already queued", entry.location);
            return false;
        }
        let generation = state.generation;
        state.jobs.push_back(Job {
            entry: entry.clone(),
            generation,
        });
        let pending = state.jobs.len();
        drop(state);

        debug!("Queued thumbnail job for {} ({} pending)", entry.location, pending);
        self.shared.job_ready.notify_one();
        true
    }

    /// Drop all pending jobs. A job already taken by the worker is retired if
    /// it has not started computing; once started it still delivers its update.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.jobs.len();
        state.jobs.clear();
        state.queued.clear();
        state.generation += 1;
        let idle = state.in_progress.is_none();
        drop(state);

        debug!("Cleared {} pending thumbnail jobs", dropped);
        if idle {
            self.shared.idle.notify_waiters();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, location: &MediaLocation) -> bool {
        self.lock().queued.contains(location)
    }

    /// No pending jobs and nothing being processed
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.jobs.is_empty() && state.in_progress.is_none()
    }

    /// Resolves once the queue is idle or shut down
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() || self.is_shut_down() {
                return;
            }
            notified.await;
        }
    }

    /// Stop the worker. Unblocks it whether it waits for a job or for a rendezvous.
    pub fn shutdown(&self) {
        info!("Shutting down thumbnail queue");
        self.shared.shutdown.cancel();
        self.shared.idle.notify_waiters();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.clone()
    }

    /// Take the next job, waiting while the queue is empty. `None` after shutdown.
    pub async fn next_job(&self) -> Option<Job> {
        loop {
            if self.is_shut_down() {
                return None;
            }

            {
                let mut state = self.lock();
                if let Some(job) = state.jobs.pop_front() {
                    state.in_progress = Some(job.entry.location.clone());
                    return Some(job);
                }
            }

            tokio::select! {
                _ = self.shared.shutdown.cancelled() => return None,
                _ = self.shared.job_ready.notified() => {}
            }
        }
    }

    /// Whether `job` survived every `clear()` since it was queued
    pub fn is_current(&self, job: &Job) -> bool {
        self.lock().generation == job.generation
    }

    fn finish_job(&self) {
        let mut state = self.lock();
        if let Some(location) = state.in_progress.take() {
            // A clear() may have let the same location be queued again meanwhile
            if !state.jobs.iter().any(|job| job.entry.location == location) {
                state.queued.remove(&location);
            }
        }
        let idle = state.jobs.is_empty();
        drop(state);

        if idle {
            self.shared.idle.notify_waiters();
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub completed: usize,
    pub failed: usize,
    pub discarded: usize,
}

/// Single background worker computing thumbnails one job at a time
pub struct ThumbnailWorker {
    queue: ThumbnailQueue,
    generator: Arc<dyn ThumbnailGenerator>,
    catalog: Arc<dyn CatalogSource>,
    sender: ListSender,
}

impl ThumbnailWorker {
    pub fn new(
        queue: ThumbnailQueue,
        generator: Arc<dyn ThumbnailGenerator>,
        catalog: Arc<dyn CatalogSource>,
        sender: ListSender,
    ) -> Self {
        Self {
            queue,
            generator,
            catalog,
            sender,
        }
    }

    pub fn spawn(self) -> JoinHandle<WorkerStats> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) -> WorkerStats {
        info!("Thumbnail worker started");
        let shutdown = self.queue.shutdown_token();
        let mut stats = WorkerStats::default();

        while let Some(job) = self.queue.next_job().await {
            let keep_going = self.process(job, &shutdown, &mut stats).await;
            self.queue.finish_job();
            if !keep_going {
                break;
            }
        }

        info!(
            "Thumbnail worker stopped: {} completed, {} failed, {} discarded",
            stats.completed, stats.failed, stats.discarded
        );
        stats
    }

    /// Compute, dispatch, then wait at the rendezvous. Returns false when the
    /// worker should stop.
    async fn process(&self, job: Job, shutdown: &CancellationToken, stats: &mut WorkerStats) -> bool {
        if !self.queue.is_current(&job) {
            debug!("Discarding retired job for {}", job.entry.location);
            stats.discarded += 1;
            return true;
        }

        let Job { mut entry, .. } = job;
        if self.catalog.has_thumbnail(&entry.location) {
            debug!("{} already has a thumbnail in the catalog", entry.location);
            stats.discarded += 1;
            return true;
        }
        debug!("Generating thumbnail for {}", entry.location);

        let generator = Arc::clone(&self.generator);
        let snapshot = entry.clone();
        let thumbnail = match tokio::task::spawn_blocking(move || generator.generate(&snapshot)).await {
            Ok(thumbnail) => thumbnail,
            Err(e) => {
                error!("Thumbnail task for {} panicked: {}", entry.location, e);
                None
            }
        };

        match thumbnail {
            Some(thumbnail) => {
                if let Err(e) = self.catalog.store_thumbnail(&entry.location, thumbnail.clone()) {
                    warn!("Failed to store thumbnail for {}: {}", entry.location, e);
                }
                entry.thumbnail = Some(thumbnail);
                stats.completed += 1;
            }
            None => {
                warn!("No thumbnail generated for {}", entry.location);
                stats.failed += 1;
            }
        }

        if shutdown.is_cancelled() {
            debug!("Shutdown before dispatching {}", entry.location);
            return false;
        }

        let receipt = match self.sender.request_update(entry) {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Cannot dispatch thumbnail update: {}", e);
                return false;
            }
        };

        let location = receipt.location().clone();
        match receipt.wait(shutdown).await {
            Ok(()) => {
                trace!("Update for {} applied", location);
                true
            }
            Err(AppError::Cancelled) => {
                debug!("Shutdown while waiting for {} to be applied", location);
                false
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}
