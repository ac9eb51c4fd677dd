#[cfg(test)]
mod video_list_tests {
    use crate::common::builders::{EntryBuilder, thumbnail, video};
    use crate::common::mocks::{GatedGenerator, PresenterEvent, ScriptedGenerator};
    use crate::common::{TestContext, bounded};
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use thumbline::config::{LastMediaConfig, ThumbnailConfig};
    use thumbline::models::{MediaEntry, MediaLocation};
    use thumbline::services::CatalogSource;
    use thumbline::ui::video_list::{RefreshOutcome, SortBy};
    use thumbline::workers::PosterThumbnailer;

    #[tokio::test]
    async fn test_missing_thumbnails_are_filled_in_and_list_stays_sorted() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut ctx = TestContext::new(
            vec![
                video("C"),
                EntryBuilder::video("B").with_thumbnail().build(),
                video("A"),
            ],
            generator.clone(),
        );

        let outcome = ctx.view.refresh().unwrap();
        assert_eq!(outcome, RefreshOutcome { rows: 3, enqueued: 2 });
        assert_eq!(ctx.titles(), vec!["A", "B", "C"]);

        ctx.run_until_idle().await;

        assert_eq!(ctx.titles(), vec!["A", "B", "C"]);
        assert!(ctx.view.list().entries().all(|entry| entry.has_thumbnail()));
        // Jobs run in catalog order
        assert_eq!(generator.calls(), vec!["C", "A"]);
        assert_eq!(ctx.view.presenter().updated_titles(), vec!["C", "A"]);

        let catalog_entry = ctx.catalog.get(&video("A").location).unwrap();
        assert!(catalog_entry.has_thumbnail());

        let (_, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_updates_apply_in_dispatch_order_regardless_of_duration() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .with_delay("a", Duration::from_millis(60))
                .with_delay("c", Duration::from_millis(30)),
        );
        let mut ctx = TestContext::new(
            vec![video("a"), video("b"), video("c"), video("d")],
            generator.clone(),
        );

        ctx.view.refresh().unwrap();
        ctx.run_until_idle().await;

        assert_eq!(ctx.view.presenter().updated_titles(), vec!["a", "b", "c", "d"]);
        assert_eq!(generator.max_concurrent(), 1);
        // Sampled while each update was being applied
        assert_eq!(ctx.view.presenter().max_in_flight, 1);
        assert_eq!(ctx.view.sender().in_flight(), 0);

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_refresh_after_completion_is_stable() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut ctx = TestContext::new(vec![video("b"), video("a")], generator.clone());

        ctx.view.refresh().unwrap();
        ctx.run_until_idle().await;
        let before = ctx.view.list().rows().to_vec();

        let outcome = ctx.view.refresh().unwrap();
        assert_eq!(outcome.enqueued, 0);
        assert_eq!(ctx.view.list().rows(), before.as_slice());
        assert!(ctx.queue.is_idle());
        assert_eq!(generator.calls().len(), 2);

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_clear_during_computation_delivers_only_the_started_job() {
        let generator = GatedGenerator::new();
        let mut ctx = TestContext::new(
            vec![video("C"), video("D"), video("E")],
            generator.clone(),
        );

        ctx.view.refresh().unwrap();
        generator.wait_started(1).await;
        assert_eq!(ctx.queue.len(), 2);

        ctx.queue.clear();
        assert!(ctx.queue.is_empty());
        generator.release_one();
        ctx.run_until_idle().await;

        assert_eq!(generator.started(), vec!["C"]);
        assert_eq!(ctx.view.presenter().updated_titles(), vec!["C"]);
        assert!(ctx.view.list().get(0).unwrap().entry.has_thumbnail());

        // Nothing else runs even after a while
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(generator.started(), vec!["C"]);

        let (_, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn test_catalog_change_supersedes_stale_update() {
        let generator = GatedGenerator::new();
        let mut ctx = TestContext::new(vec![video("A"), video("B")], generator.clone());

        ctx.view.refresh().unwrap();
        generator.wait_started(1).await;

        // A disappears while its thumbnail is being computed
        assert!(ctx.catalog.remove(&video("A").location));
        generator.release_one();
        generator.release_one();
        ctx.run_until_idle().await;

        assert_eq!(ctx.titles(), vec!["B"]);
        assert_eq!(ctx.view.presenter().updated_titles(), vec!["B"]);
        assert_eq!(generator.started(), vec!["A", "B"]);
        assert_eq!(ctx.view.sender().in_flight(), 0);

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_entry_edited_during_computation_keeps_catalog_data() {
        let generator = GatedGenerator::new();
        let mut ctx = TestContext::new(vec![video("A")], generator.clone());

        ctx.view.refresh().unwrap();
        generator.wait_started(1).await;

        // Renamed and re-timed while its thumbnail is being computed
        let edited = MediaEntry::video(video("A").location, "A-renamed").with_length(Duration::from_secs(42));
        ctx.catalog.upsert(edited);
        generator.release_one();
        ctx.run_until_idle().await;

        assert_eq!(ctx.titles(), vec!["A-renamed"]);
        let row = &ctx.view.list().get(0).unwrap().entry;
        assert_eq!(row.length, Duration::from_secs(42));
        assert!(row.has_thumbnail());
        assert_eq!(ctx.view.presenter().updated_titles(), vec!["A-renamed"]);

        // The refresh during the computation did not queue A again
        assert_eq!(generator.started(), vec!["A"]);
        let stored = ctx.catalog.get(&video("A").location).unwrap();
        assert_eq!(stored.title, "A-renamed");
        assert!(stored.has_thumbnail());

        let (_, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.discarded, 0);
    }

    #[tokio::test]
    async fn test_requeued_entry_completed_meanwhile_is_not_recomputed() {
        let generator = GatedGenerator::new();
        let mut ctx = TestContext::new(vec![video("A"), video("B")], generator.clone());

        ctx.view.refresh().unwrap();
        generator.wait_started(1).await;

        // After a clear the refresh queues A again from its thumbnail-less copy
        ctx.queue.clear();
        assert_eq!(ctx.view.refresh().unwrap().enqueued, 2);
        generator.release_one();
        generator.release_one();
        ctx.run_until_idle().await;

        assert_eq!(generator.started(), vec!["A", "B"]);
        assert_eq!(ctx.view.presenter().updated_titles(), vec!["A", "B"]);
        assert!(ctx.view.list().entries().all(|entry| entry.has_thumbnail()));

        let (_, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.discarded, 1);
    }

    #[tokio::test]
    async fn test_empty_catalog_signals_empty_each_refresh() {
        let mut ctx = TestContext::new(Vec::new(), Arc::new(ScriptedGenerator::new()));

        assert_eq!(ctx.view.refresh().unwrap(), RefreshOutcome::default());
        assert_eq!(ctx.view.refresh().unwrap(), RefreshOutcome::default());
        ctx.run_until_idle().await;

        assert!(ctx.view.list().is_empty());
        assert_eq!(ctx.view.presenter().empty_count(), 2);
        assert_eq!(
            ctx.view.presenter().events,
            vec![PresenterEvent::Empty, PresenterEvent::Empty]
        );

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_generation_still_dispatches_once() {
        let generator = Arc::new(ScriptedGenerator::new().failing("b"));
        let mut ctx = TestContext::new(vec![video("a"), video("b")], generator.clone());

        ctx.view.refresh().unwrap();
        ctx.run_until_idle().await;

        assert_eq!(ctx.view.presenter().updated_titles(), vec!["a", "b"]);
        assert!(!ctx.view.list().get(1).unwrap().entry.has_thumbnail());
        assert!(!ctx.catalog.get(&video("b").location).unwrap().has_thumbnail());

        // Still missing, so the next refresh tries again
        assert_eq!(ctx.view.refresh().unwrap().enqueued, 1);
        ctx.run_until_idle().await;

        let (_, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(generator.calls(), vec!["a", "b", "b"]);
    }

    #[tokio::test]
    async fn test_shutdown_releases_worker_waiting_at_rendezvous() {
        let mut ctx = TestContext::new(vec![video("a")], Arc::new(ScriptedGenerator::new()));
        ctx.view.refresh().unwrap();

        // The view never drains its channel, so the worker parks after dispatching
        let sender = ctx.view.sender();
        bounded(async {
            while sender.in_flight() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;

        let (mut view, stats) = ctx.shutdown().await;
        assert_eq!(stats.completed, 1);

        // The update is still deliverable; applying it frees the slot
        assert_eq!(view.drain_pending(), 1);
        assert_eq!(sender.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_destroy_breaks_rendezvous_and_unregisters() {
        let ctx = TestContext::new(
            vec![video("a"), video("b")],
            Arc::new(ScriptedGenerator::new()),
        );
        let TestContext {
            catalog,
            queue,
            mut view,
            worker,
            ..
        } = ctx;
        view.refresh().unwrap();

        let sender = view.sender();
        bounded(async {
            while sender.in_flight() == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        drop(sender);

        let presenter = view.destroy();
        assert_eq!(catalog.handler_count(), 0);
        assert!(queue.is_empty());
        assert!(presenter.updated_titles().is_empty());

        // The worker notices the broken rendezvous and stops on its own
        let stats = bounded(worker).await.unwrap();
        assert_eq!(stats.completed, 1);
        queue.shutdown();
    }

    #[tokio::test]
    async fn test_highlight_survives_catalog_change() {
        let mut ctx = TestContext::new(
            vec![video("a"), video("b")],
            Arc::new(ScriptedGenerator::new()),
        );
        ctx.view.activate(&LastMediaConfig {
            location: Some(video("b").location.to_string()),
            time_ms: 90_000,
        });
        ctx.view.refresh().unwrap();
        ctx.run_until_idle().await;

        ctx.catalog.upsert(video("c"));
        ctx.run_until_idle().await;

        assert_eq!(ctx.titles(), vec!["a", "b", "c"]);
        let highlighted = ctx.view.list().highlighted().unwrap();
        assert_eq!(highlighted.entry.title, "b");
        assert_eq!(highlighted.last_played, Some(Duration::from_secs(90)));
        assert!(ctx.view.list().entries().all(|entry| entry.has_thumbnail()));

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_sort_by_length_then_toggle() {
        let mut ctx = TestContext::new(
            vec![
                EntryBuilder::video("long").with_length(Duration::from_secs(7200)).build(),
                EntryBuilder::video("short").with_length(Duration::from_secs(600)).build(),
                EntryBuilder::video("mid").with_length(Duration::from_secs(3600)).build(),
                EntryBuilder::audio("song").build(),
            ],
            Arc::new(ScriptedGenerator::new()),
        );
        ctx.view.refresh().unwrap();
        assert_eq!(ctx.titles(), vec!["long", "mid", "short"]);

        ctx.view.sort_by(SortBy::Length);
        assert_eq!(ctx.titles(), vec!["short", "mid", "long"]);
        ctx.view.sort_by(SortBy::Length);
        assert_eq!(ctx.titles(), vec!["long", "mid", "short"]);

        ctx.run_until_idle().await;
        // Thumbnails do not change the length order
        assert_eq!(ctx.titles(), vec!["long", "mid", "short"]);
        assert_eq!(
            ctx.view.select(0),
            Some(MediaLocation::new("/media/long.mkv"))
        );
        assert_eq!(ctx.playback.stops(), 1);

        ctx.shutdown().await;
    }

    #[tokio::test]
    async fn test_scanned_directory_uses_poster_images() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("with poster.mkv"), b"").unwrap();
        std::fs::write(temp_dir.path().join("bare.mp4"), b"").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"").unwrap();
        RgbaImage::from_pixel(64, 32, Rgba([0, 0, 255, 255]))
            .save(temp_dir.path().join("with poster.png"))
            .unwrap();

        let config = ThumbnailConfig {
            width: 16,
            height: 16,
            ..ThumbnailConfig::default()
        };
        let mut ctx = TestContext::new(Vec::new(), Arc::new(PosterThumbnailer::from_config(&config)));

        assert_eq!(ctx.catalog.scan_directory(temp_dir.path()).unwrap(), 2);
        ctx.run_until_idle().await;

        assert_eq!(ctx.titles(), vec!["bare", "with poster"]);
        assert!(!ctx.view.list().get(0).unwrap().entry.has_thumbnail());

        let poster = ctx.view.list().get(1).unwrap().entry.thumbnail.clone().unwrap();
        assert_eq!((poster.width(), poster.height()), (16, 8));
        assert_ne!(poster, thumbnail());

        let stored = ctx
            .catalog
            .items_by_type(thumbline::models::MediaType::Video)
            .unwrap();
        assert_eq!(stored.iter().filter(|entry| entry.has_thumbnail()).count(), 1);

        ctx.shutdown().await;
    }
}
