//! Player configuration
//!
//! Built from the command line; nothing is read from or written to disk.

use std::path::PathBuf;

/// Window title used when none is given
pub const DEFAULT_WINDOW_TITLE: &str = "SDL Video Player";

/// Settings for one playback session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Media file to play
    pub input: PathBuf,
    pub window_title: String,
    /// Verbose logging
    pub debug: bool,
}

impl PlayerConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
