//! Configuration module
//!
//! Runtime settings for one playback session.

mod player_config;

pub use player_config::*;
