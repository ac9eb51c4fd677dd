// Shared defaults for the library scanner and thumbnailer

// === Catalog scanning ===
/// File extensions treated as video when scanning a directory
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "m4v", "avi", "mov", "webm", "mpg", "mpeg", "ts", "wmv", "flv", "ogv",
];

// === Thumbnails ===
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 120;
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 68;
pub const DEFAULT_POSTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
