//! Video player module
//!
//! Acquires the source, decoder, converter and window in order, runs one
//! pump pass and releases everything in reverse order on every exit path.

use tracing::info;

use super::decoder::{VideoDecoder, YuvConverter};
use super::pacing::ThreadSleeper;
use super::pump::{select_video_track, Demuxer, FramePump, PlaybackStats};
use super::source::MediaSource;
use crate::config::PlayerConfig;
use crate::display::SdlWindow;
use crate::error::Result;

/// Play the first video track of `config.input` to completion.
pub fn play(config: &PlayerConfig) -> Result<PlaybackStats> {
    let mut source = MediaSource::open(&config.input)?;

    let track = select_video_track(&source.tracks())?;
    info!("Using video track {}", track);

    let decoder = VideoDecoder::open(&source, track)?;
    let (width, height) = (decoder.width(), decoder.height());
    let converter = YuvConverter::new(decoder.format(), width, height)?;

    let mut window = SdlWindow::open(&config.window_title, width, height)?;
    let sink = window.sink()?;

    FramePump::new(track, decoder, converter, sink, ThreadSleeper).run(&mut source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlayerError;

    #[test]
    fn test_play_nonexistent_fails_before_display() {
        let config = PlayerConfig::new("nonexistent.mp4");
        let result = play(&config);
        assert!(matches!(result, Err(PlayerError::OpenSource { .. })));
    }
}
