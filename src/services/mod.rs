pub mod catalog;
pub mod playback;

pub use catalog::{CatalogSource, MemoryCatalog, is_video_file};
pub use playback::{NoPlayback, PlaybackControl};
