/// Background thumbnail processing
pub mod thumbnail_generator;
pub mod thumbnailer;

pub use thumbnail_generator::{PosterThumbnailer, ThumbnailGenerator};
pub use thumbnailer::{Job, ThumbnailQueue, ThumbnailWorker, WorkerStats};
