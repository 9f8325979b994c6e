//! Display module
//!
//! Presents converted frames in an SDL2 window.

mod sdl;

pub use sdl::SdlWindow;
