use crate::models::MediaLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Display channel closed")]
    DispatchClosed,

    #[error("Update for {0} requested while another update is still pending")]
    UpdateInFlight(MediaLocation),

    #[error("Rendezvous broken before update for {0} was applied")]
    RendezvousBroken(MediaLocation),

    #[error("Cancelled")]
    Cancelled,

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Thumbnail error for {location}: {reason}")]
    Thumbnail {
        location: MediaLocation,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
