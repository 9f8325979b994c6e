//! Media source
//!
//! Opens a container with FFmpeg and hands out its packets one at a time.

use std::path::Path;
use tracing::{info, warn};

use ffmpeg_next as ffmpeg;
use ffmpeg::format::context::Input;
use ffmpeg::media::Type;
use ffmpeg::Packet;

use super::pump::{Demuxer, EncodedPacket, MediaKind, TrackInfo};
use crate::error::{PlayerError, Result};

/// An opened container with its stream info already probed
pub struct MediaSource {
    input: Input,
    exhausted: bool,
}

impl MediaSource {
    /// Open `path` and probe its streams.
    pub fn open(path: &Path) -> Result<Self> {
        // Safe to call more than once
        ffmpeg::init().map_err(PlayerError::Init)?;
        ffmpeg::format::network::init();

        let input = ffmpeg::format::input(path).map_err(|source| PlayerError::OpenSource {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Opened {} ({}, {} streams)",
            path.display(),
            input.format().name(),
            input.streams().count()
        );

        Ok(Self {
            input,
            exhausted: false,
        })
    }

    pub(crate) fn input(&self) -> &Input {
        &self.input
    }
}

impl Demuxer for MediaSource {
    type Packet = Packet;

    fn tracks(&self) -> Vec<TrackInfo> {
        self.input
            .streams()
            .map(|stream| TrackInfo {
                index: stream.index(),
                kind: media_kind(stream.parameters().medium()),
            })
            .collect()
    }

    fn next_packet(&mut self) -> Option<Packet> {
        if self.exhausted {
            return None;
        }

        let mut packet = Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Some(packet),
            Err(ffmpeg::Error::Eof) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                warn!("Read error, treating as end of source: {}", e);
                self.exhausted = true;
                None
            }
        }
    }
}

impl EncodedPacket for Packet {
    fn track_index(&self) -> usize {
        self.stream()
    }
}

fn media_kind(medium: Type) -> MediaKind {
    match medium {
        Type::Video => MediaKind::Video,
        Type::Audio => MediaKind::Audio,
        Type::Subtitle => MediaKind::Subtitle,
        Type::Data => MediaKind::Data,
        Type::Attachment => MediaKind::Attachment,
        Type::Unknown => MediaKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_nonexistent() {
        let result = MediaSource::open(Path::new("nonexistent.mp4"));
        match result {
            Err(PlayerError::OpenSource { path, .. }) => {
                assert_eq!(path, Path::new("nonexistent.mp4"));
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("opened a file that does not exist"),
        }
    }

    #[test]
    fn test_media_kind_mapping() {
        assert_eq!(media_kind(Type::Video), MediaKind::Video);
        assert_eq!(media_kind(Type::Audio), MediaKind::Audio);
        assert_eq!(media_kind(Type::Unknown), MediaKind::Unknown);
    }

    #[test]
    fn test_packet_track_index() {
        let mut packet = Packet::empty();
        packet.set_stream(3);
        assert_eq!(packet.track_index(), 3);
    }
}
