use tracing::info;

use super::display_list::VideoRow;

/// Rendering side of the list. Called on the display thread only.
pub trait Presenter {
    /// Nothing to show after a rebuild
    fn show_empty(&mut self);

    /// The whole list changed (rebuild, sort, activation)
    fn show_rows(&mut self, rows: &[VideoRow]);

    /// A single row changed in place
    fn row_updated(&mut self, index: usize, row: &VideoRow);
}

/// Writes list changes to the log; used by the command line front end
#[derive(Debug, Default)]
pub struct LogPresenter {
    updates: usize,
}

impl LogPresenter {
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl Presenter for LogPresenter {
    fn show_empty(&mut self) {
        info!("No videos found");
    }

    fn show_rows(&mut self, rows: &[VideoRow]) {
        info!("Showing {} videos", rows.len());
        for (index, row) in rows.iter().enumerate() {
            let marker = match row.last_played {
                Some(time) => format!(" (last played at {}s)", time.as_secs()),
                None => String::new(),
            };
            info!("  [{}] {}{}", index, row.entry.title, marker);
        }
    }

    fn row_updated(&mut self, index: usize, row: &VideoRow) {
        self.updates += 1;
        match &row.entry.thumbnail {
            Some(thumbnail) => info!(
                "  [{}] {} thumbnail {}x{}",
                index,
                row.entry.title,
                thumbnail.width(),
                thumbnail.height()
            ),
            None => info!("  [{}] {} has no thumbnail", index, row.entry.title),
        }
    }
}
