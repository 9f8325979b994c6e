//! Frame Pump Player
//!
//! Plays the first video track of a media file in an SDL2 window, pacing
//! frames by their presentation timestamps.

mod config;
mod display;
mod error;
mod video;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::PlayerConfig;

/// Minimal FFmpeg + SDL2 video player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Media file to play
    input: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Parse the command line; usage errors exit with code 1.
    fn parse_or_exit() -> Self {
        match Args::try_parse() {
            Ok(args) => args,
            Err(e) => {
                let code = if e.use_stderr() { 1 } else { 0 };
                // Best effort: nothing left to report a failed write to
                e.print().ok();
                std::process::exit(code);
            }
        }
    }
}

impl From<Args> for PlayerConfig {
    fn from(args: Args) -> Self {
        PlayerConfig::new(args.input).with_debug(args.debug)
    }
}

fn main() -> Result<()> {
    let config = PlayerConfig::from(Args::parse_or_exit());

    // Initialize logging
    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Playing {:?}", config.input);

    let stats = video::play(&config)
        .with_context(|| format!("Failed to play {}", config.input.display()))?;

    info!(
        "Playback finished: {} frames presented, {} packets read ({} other tracks, {} rejected), {}ms paced",
        stats.frames_presented,
        stats.packets_read,
        stats.packets_other_track,
        stats.packets_rejected,
        stats.total_delay.as_millis()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_args_positional_input() {
        let args = Args::try_parse_from(["player", "clip.mp4"]).unwrap();
        assert_eq!(args.input, PathBuf::from("clip.mp4"));
        assert!(!args.debug);

        let config = PlayerConfig::from(args);
        assert_eq!(config.input, PathBuf::from("clip.mp4"));
    }

    #[test]
    fn test_args_debug_flag() {
        let args = Args::try_parse_from(["player", "--debug", "clip.mp4"]).unwrap();
        assert!(PlayerConfig::from(args).debug);
    }

    #[test]
    fn test_args_missing_input_is_usage_error() {
        let err = Args::try_parse_from(["player"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_args_help_goes_to_stdout() {
        let err = Args::try_parse_from(["player", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
