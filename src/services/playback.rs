use tracing::debug;

/// Whatever is playing outside the list. Selecting a video hands playback
/// over to the host's player, so running audio is stopped first.
pub trait PlaybackControl: Send + Sync {
    fn stop_audio(&self);
}

/// For hosts with no audio service
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlayback;

impl PlaybackControl for NoPlayback {
    fn stop_audio(&self) {
        debug!("No audio service to stop");
    }
}
