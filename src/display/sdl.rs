//! SDL2 display sink
//!
//! One window, one renderer and one streaming IYUV texture the
//! size of the video.

use tracing::{info, trace};

use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::{EventPump, Sdl};

use crate::error::{PlayerError, Result};
use crate::video::{DisplaySink, PlanarImage};

/// Fixed-size output window
pub struct SdlWindow {
    canvas: WindowCanvas,
    creator: TextureCreator<WindowContext>,
    events: EventPump,
    width: u32,
    height: u32,
    // Dropped last: shuts SDL down
    _context: Sdl,
}

impl SdlWindow {
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
        let context = sdl2::init().map_err(PlayerError::Display)?;
        let video = context.video().map_err(PlayerError::Display)?;

        let window = video
            .window(title, width, height)
            .opengl()
            .build()
            .map_err(|e| PlayerError::Display(format!("could not create window - {}", e)))?;

        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| PlayerError::Display(format!("could not create renderer - {}", e)))?;
        let creator = canvas.texture_creator();
        let events = context.event_pump().map_err(PlayerError::Display)?;

        info!("Opened window \"{}\" {}x{}", title, width, height);

        Ok(Self {
            canvas,
            creator,
            events,
            width,
            height,
            _context: context,
        })
    }

    /// Create the streaming texture and return a sink drawing through it.
    pub fn sink(&mut self) -> Result<SdlSink<'_>> {
        let texture = self
            .creator
            .create_texture_streaming(PixelFormatEnum::IYUV, self.width, self.height)
            .map_err(|e| PlayerError::Display(format!("could not create texture - {}", e)))?;

        Ok(SdlSink {
            canvas: &mut self.canvas,
            events: &mut self.events,
            texture,
            height: self.height as usize,
        })
    }
}

/// Uploads planar YUV 4:2:0 images and presents them stretched to the window
pub struct SdlSink<'a> {
    canvas: &'a mut WindowCanvas,
    events: &'a mut EventPump,
    texture: Texture<'a>,
    height: usize,
}

impl DisplaySink for SdlSink<'_> {
    fn upload<I: PlanarImage>(&mut self, image: &I) -> Result<()> {
        let (y_pitch, u_pitch, v_pitch) = (image.stride(0), image.stride(1), image.stride(2));

        // Lengths as checked by `update_yuv`
        let y = exact_plane(image.plane(0), y_pitch * self.height)?;
        let u = exact_plane(image.plane(1), u_pitch * self.height / 2)?;
        let v = exact_plane(image.plane(2), v_pitch * self.height / 2)?;

        self.texture
            .update_yuv(None, y, y_pitch, u, u_pitch, v, v_pitch)
            .map_err(|e| PlayerError::Display(e.to_string()))
    }

    fn present(&mut self) -> Result<()> {
        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, None)
            .map_err(PlayerError::Display)?;
        self.canvas.present();

        // Keep the window responsive; events do not affect playback
        for event in self.events.poll_iter() {
            trace!("Window event: {:?}", event);
        }
        Ok(())
    }
}

/// Trim `plane` to the `len` bytes SDL expects.
fn exact_plane(plane: &[u8], len: usize) -> Result<&[u8]> {
    plane.get(..len).ok_or_else(|| {
        PlayerError::Display(format!(
            "plane of {} bytes is shorter than {} bytes",
            plane.len(),
            len
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_plane_trims_padding_rows() {
        let plane = vec![7u8; 64 * 9];
        let trimmed = exact_plane(&plane, 64 * 8).unwrap();
        assert_eq!(trimmed.len(), 64 * 8);
        assert_eq!(trimmed.as_ptr(), plane.as_ptr());
    }

    #[test]
    fn test_exact_plane_too_short() {
        let plane = vec![0u8; 100];
        let result = exact_plane(&plane, 64 * 2);
        assert!(matches!(result, Err(PlayerError::Display(_))));
    }

    #[test]
    fn test_exact_plane_empty() {
        assert_eq!(exact_plane(&[], 0).unwrap().len(), 0);
    }
}
