//! Frame pump
//!
//! Drives the decode → convert → present cycle for one video track until
//! the source runs dry. The pump is generic over its collaborators so the
//! FFmpeg/SDL adapters and the in-memory test doubles share one loop.

use std::time::Duration;
use tracing::{debug, info, warn};

use super::pacing::{PacingClock, Sleeper};
use crate::error::{PlayerError, Result};

/// Media kind of a demuxed track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Unknown,
}

/// One track of an opened source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackInfo {
    pub index: usize,
    pub kind: MediaKind,
}

/// An encoded packet tagged with the track it belongs to.
pub trait EncodedPacket {
    fn track_index(&self) -> usize;
}

/// A decoded frame.
pub trait DecodedFrame {
    /// Presentation timestamp in microseconds, if the stream carries one.
    fn timestamp_us(&self) -> Option<i64>;
}

/// Image made of separately strided planes.
pub trait PlanarImage {
    fn plane(&self, index: usize) -> &[u8];
    fn stride(&self, index: usize) -> usize;
}

/// Container reader.
pub trait Demuxer {
    type Packet: EncodedPacket;

    fn tracks(&self) -> Vec<TrackInfo>;

    /// Next packet, or `None` once the source is exhausted.
    fn next_packet(&mut self) -> Option<Self::Packet>;
}

/// Decoder bound to a single track.
pub trait FrameDecoder {
    type Packet;
    type Frame: DecodedFrame;

    fn submit(&mut self, packet: &Self::Packet) -> Result<()>;

    /// Next frame the decoder is ready to emit.
    fn receive(&mut self) -> Option<Self::Frame>;

    /// Signal that no more packets follow so buffered frames can be drained.
    fn finish(&mut self) {}
}

/// Converts decoded frames into the presentation layout.
pub trait FrameConverter {
    type Input;
    type Output: PlanarImage;

    /// Allocate the destination buffer. Called exactly once per session.
    fn allocate(&self) -> Self::Output;

    fn convert(&mut self, input: &Self::Input, output: &mut Self::Output) -> Result<()>;
}

/// Presentation surface.
pub trait DisplaySink {
    fn upload<I: PlanarImage>(&mut self, image: &I) -> Result<()>;
    fn present(&mut self) -> Result<()>;
}

/// Return the index of the first video track.
pub fn select_video_track(tracks: &[TrackInfo]) -> Result<usize> {
    tracks
        .iter()
        .find(|track| track.kind == MediaKind::Video)
        .map(|track| track.index)
        .ok_or(PlayerError::NoVideoTrack)
}

/// Counters collected over one playback pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStats {
    pub packets_read: u64,
    pub packets_other_track: u64,
    pub packets_rejected: u64,
    pub frames_presented: u64,
    pub total_delay: Duration,
}

/// Single forward pass over one video track
pub struct FramePump<D, C, S, P>
where
    D: FrameDecoder,
    C: FrameConverter<Input = D::Frame>,
{
    video_track: usize,
    decoder: D,
    converter: C,
    sink: S,
    sleeper: P,
    /// Reused for every frame of the session
    converted: C::Output,
    clock: PacingClock,
    stats: PlaybackStats,
}

impl<D, C, S, P> FramePump<D, C, S, P>
where
    D: FrameDecoder,
    C: FrameConverter<Input = D::Frame>,
    S: DisplaySink,
    P: Sleeper,
{
    pub fn new(video_track: usize, decoder: D, converter: C, sink: S, sleeper: P) -> Self {
        let converted = converter.allocate();
        Self {
            video_track,
            decoder,
            converter,
            sink,
            sleeper,
            converted,
            clock: PacingClock::new(),
            stats: PlaybackStats::default(),
        }
    }

    /// Pump every packet of `source` and return the pass counters.
    pub fn run<M>(mut self, source: &mut M) -> Result<PlaybackStats>
    where
        M: Demuxer<Packet = D::Packet>,
    {
        info!("Frame pump started on track {}", self.video_track);

        while let Some(packet) = source.next_packet() {
            self.stats.packets_read += 1;

            if packet.track_index() != self.video_track {
                self.stats.packets_other_track += 1;
                continue;
            }

            match self.decoder.submit(&packet) {
                Ok(()) => self.drain()?,
                Err(e) if e.is_transient() => {
                    warn!("Skipping packet {}: {}", self.stats.packets_read, e);
                    self.stats.packets_rejected += 1;
                }
                Err(e) => return Err(e),
            }
            // `packet` is released here whether or not it was decoded
        }

        debug!("End of source, draining decoder");
        self.decoder.finish();
        self.drain()?;

        info!(
            "Frame pump finished: {} frames from {} packets",
            self.stats.frames_presented, self.stats.packets_read
        );
        Ok(self.stats)
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(frame) = self.decoder.receive() {
            self.present(&frame)?;
        }
        Ok(())
    }

    fn present(&mut self, frame: &D::Frame) -> Result<()> {
        let timestamp = frame.timestamp_us().unwrap_or(0);
        if let Some(delay) = self.clock.advance(timestamp) {
            debug!("Frame at {}us, waiting {}ms", timestamp, delay.as_millis());
            self.sleeper.sleep(delay);
            self.stats.total_delay += delay;
        }

        self.converter.convert(frame, &mut self.converted)?;
        self.sink.upload(&self.converted)?;
        self.sink.present()?;
        self.stats.frames_presented += 1;
        Ok(())
    }
}
