//! Video decoder module
//!
//! FFmpeg decoder bound to one track, plus the scaler that brings its
//! frames into planar YUV 4:2:0.

use tracing::{info, warn};

use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::{Packet, Rational, Rescale};

use super::pump::{DecodedFrame, FrameConverter, FrameDecoder, PlanarImage};
use super::source::MediaSource;
use crate::error::{PlayerError, Result};

/// Microsecond ticks
const MICROSECONDS: Rational = Rational(1, 1_000_000);

/// Decoded frame with its timestamp already in microseconds
pub struct DecodedVideo {
    frame: VideoFrame,
    timestamp_us: Option<i64>,
}

impl DecodedFrame for DecodedVideo {
    fn timestamp_us(&self) -> Option<i64> {
        self.timestamp_us
    }
}

/// Decoder session for a single video track
pub struct VideoDecoder {
    decoder: ffmpeg::codec::decoder::Video,
    /// Time base of the bound stream
    time_base: Rational,
}

impl VideoDecoder {
    /// Create and open a decoder for `track` of `source`.
    pub fn open(source: &MediaSource, track: usize) -> Result<Self> {
        let stream = source
            .input()
            .stream(track)
            .ok_or(PlayerError::NoVideoTrack)?;
        let time_base = stream.time_base();

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(PlayerError::CodecParameters)?;
        let codec_id = context.id();
        let decoder = context.decoder().video().map_err(|e| match e {
            ffmpeg::Error::DecoderNotFound => PlayerError::UnsupportedCodec(format!("{:?}", codec_id)),
            e => PlayerError::OpenCodec(e),
        })?;

        info!(
            "Opened decoder {:?}: {}x{}, format: {:?}, time base: {}",
            codec_id,
            decoder.width(),
            decoder.height(),
            decoder.format(),
            time_base
        );

        Ok(Self { decoder, time_base })
    }

    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    pub fn format(&self) -> Pixel {
        self.decoder.format()
    }
}

impl FrameDecoder for VideoDecoder {
    type Packet = Packet;
    type Frame = DecodedVideo;

    fn submit(&mut self, packet: &Packet) -> Result<()> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| PlayerError::Decode(e.to_string()))
    }

    fn receive(&mut self) -> Option<DecodedVideo> {
        let mut frame = VideoFrame::empty();
        if !frame_ready(self.decoder.receive_frame(&mut frame)) {
            return None;
        }
        let timestamp_us = frame
            .pts()
            .map(|pts| to_microseconds(pts, self.time_base));
        Some(DecodedVideo {
            frame,
            timestamp_us,
        })
    }

    fn finish(&mut self) {
        if let Err(e) = self.decoder.send_eof() {
            warn!("Failed to flush decoder: {}", e);
        }
    }
}

/// Whether `receive_frame` produced a frame. EAGAIN and EOF just mean
/// nothing is ready; anything else is logged.
fn frame_ready(result: std::result::Result<(), ffmpeg::Error>) -> bool {
    match result {
        Ok(()) => true,
        Err(ffmpeg::Error::Eof) => false,
        Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::util::error::EAGAIN => false,
        Err(e) => {
            warn!("Decoder failed to produce a frame: {}", e);
            false
        }
    }
}

/// Express `pts` (in `time_base` units) in microseconds.
fn to_microseconds(pts: i64, time_base: Rational) -> i64 {
    if time_base.numerator() == 0 || time_base.denominator() == 0 {
        return pts;
    }
    pts.rescale(time_base, MICROSECONDS)
}

/// Bilinear scaler into YUV420P at the source's own dimensions
pub struct YuvConverter {
    scaler: Scaler,
    width: u32,
    height: u32,
}

impl YuvConverter {
    pub fn new(source_format: Pixel, width: u32, height: u32) -> Result<Self> {
        let scaler = Scaler::get(
            source_format,
            width,
            height,
            Pixel::YUV420P,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(PlayerError::Converter)?;

        Ok(Self {
            scaler,
            width,
            height,
        })
    }
}

impl FrameConverter for YuvConverter {
    type Input = DecodedVideo;
    type Output = VideoFrame;

    fn allocate(&self) -> VideoFrame {
        VideoFrame::new(Pixel::YUV420P, self.width, self.height)
    }

    fn convert(&mut self, input: &DecodedVideo, output: &mut VideoFrame) -> Result<()> {
        self.scaler
            .run(&input.frame, output)
            .map_err(|e| PlayerError::Convert(e.to_string()))
    }
}

impl PlanarImage for VideoFrame {
    fn plane(&self, index: usize) -> &[u8] {
        self.data(index)
    }

    fn stride(&self, index: usize) -> usize {
        VideoFrame::stride(self, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_microseconds() {
        // 90 kHz MPEG-TS clock
        assert_eq!(to_microseconds(3_600, Rational(1, 90_000)), 40_000);
        // 1/25 s frame ticks
        assert_eq!(to_microseconds(2, Rational(1, 25)), 80_000);
        // Already microseconds
        assert_eq!(to_microseconds(123_456, MICROSECONDS), 123_456);
    }

    #[test]
    fn test_to_microseconds_unknown_time_base() {
        assert_eq!(to_microseconds(40_000, Rational(0, 1)), 40_000);
        assert_eq!(to_microseconds(40_000, Rational(1, 0)), 40_000);
    }

    #[test]
    fn test_frame_ready() {
        assert!(frame_ready(Ok(())));
        assert!(!frame_ready(Err(ffmpeg::Error::Eof)));
        assert!(!frame_ready(Err(ffmpeg::Error::Other {
            errno: ffmpeg::util::error::EAGAIN,
        })));
        // Corrupt data ends the drain too, after a warning
        assert!(!frame_ready(Err(ffmpeg::Error::InvalidData)));
    }

    #[test]
    fn test_converter_buffer_layout() {
        ffmpeg::init().unwrap();
        let converter = YuvConverter::new(Pixel::RGB24, 64, 48).unwrap();
        let buffer = converter.allocate();
        assert_eq!(buffer.format(), Pixel::YUV420P);
        assert_eq!((buffer.width(), buffer.height()), (64, 48));
        assert!(PlanarImage::stride(&buffer, 0) >= 64);
        assert!(PlanarImage::stride(&buffer, 1) >= 32);
        assert!(PlanarImage::plane(&buffer, 0).len() >= 64 * 48);
    }

    #[test]
    fn test_converter_reuses_buffer() {
        ffmpeg::init().unwrap();
        let mut converter = YuvConverter::new(Pixel::RGB24, 32, 16).unwrap();
        let mut output = converter.allocate();
        let address = PlanarImage::plane(&output, 0).as_ptr();

        for ts in [0, 40_000] {
            let input = DecodedVideo {
                frame: VideoFrame::new(Pixel::RGB24, 32, 16),
                timestamp_us: Some(ts),
            };
            converter.convert(&input, &mut output).unwrap();
            assert_eq!(PlanarImage::plane(&output, 0).as_ptr(), address);
        }
    }
}
