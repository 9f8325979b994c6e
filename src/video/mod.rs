//! Video module
//!
//! Decoding and timestamp-paced presentation of a single video track.
//!
//! # Usage
//!
//! ```rust,ignore
//! use video::play;
//!
//! let stats = play(&PlayerConfig::new("clip.mp4"))?;
//! println!("{} frames", stats.frames_presented);
//! ```

mod decoder;
mod pacing;
mod player;
mod pump;
mod source;

pub use player::play;
pub use pump::{DisplaySink, PlanarImage};
