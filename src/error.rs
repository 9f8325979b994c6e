//! Player error types
//!
//! Opening a source also probes its stream info, so a failed probe surfaces
//! as `OpenSource`.
//!
//! Every setup failure is fatal and travels up to `main` as a `PlayerError`.
//! `Decode` is the only transient kind: the pump logs it and moves on.

use std::path::PathBuf;
use thiserror::Error;

use ffmpeg_next as ffmpeg;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("could not initialize FFmpeg")]
    Init(#[source] ffmpeg::Error),

    #[error("could not open file {}", path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: ffmpeg::Error,
    },

    #[error("could not find a video stream")]
    NoVideoTrack,

    #[error("could not copy codec parameters")]
    CodecParameters(#[source] ffmpeg::Error),

    #[error("unsupported codec {0}")]
    UnsupportedCodec(String),

    #[error("could not open codec")]
    OpenCodec(#[source] ffmpeg::Error),

    #[error("could not create pixel converter")]
    Converter(#[source] ffmpeg::Error),

    /// Decoder rejected one packet.
    #[error("decoder rejected packet: {0}")]
    Decode(String),

    #[error("could not convert frame: {0}")]
    Convert(String),

    #[error("SDL: {0}")]
    Display(String),
}

impl PlayerError {
    /// Whether the pump may skip past this error instead of stopping.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlayerError::Decode(_))
    }
}
