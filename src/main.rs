use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use thumbline::config::Config;
use thumbline::services::{CatalogSource, MemoryCatalog, NoPlayback};
use thumbline::ui::video_list::{LogPresenter, VideoListView};
use thumbline::workers::{PosterThumbnailer, ThumbnailQueue, ThumbnailWorker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("thumbline=debug")),
        )
        .init();

    info!("Starting thumbline");

    let config = Config::load().context("Failed to load configuration")?;
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let catalog = Arc::new(MemoryCatalog::new());
    let found = catalog
        .scan_directory(&dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    info!("Found {} videos in {}", found, dir.display());

    let queue = ThumbnailQueue::new();
    let catalog_source: Arc<dyn CatalogSource> = catalog.clone();
    let mut view = VideoListView::new(
        Arc::clone(&catalog_source),
        queue.clone(),
        Arc::new(NoPlayback),
        LogPresenter::default(),
        &config.list,
    );

    let worker = ThumbnailWorker::new(
        queue.clone(),
        Arc::new(PosterThumbnailer::from_config(&config.thumbnails)),
        catalog_source,
        view.sender(),
    )
    .spawn();

    view.activate(&config.last_media);
    view.refresh()?;

    // Run until every queued thumbnail has been applied
    loop {
        tokio::select! {
            _ = queue.wait_idle() => break,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            open = view.next_message() => {
                if !open {
                    break;
                }
            }
        }
    }

    queue.shutdown();
    match worker.await {
        Ok(stats) => info!(
            "Done: {} thumbnails, {} without thumbnail, {} discarded",
            stats.completed, stats.failed, stats.discarded
        ),
        Err(e) => warn!("Thumbnail worker failed: {}", e),
    }

    let presenter = view.destroy();
    info!("Applied {} row updates", presenter.updates());
    Ok(())
}
