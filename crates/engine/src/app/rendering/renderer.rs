use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::scene::SceneRuntime;

use super::{FrameCanvas, Rgba, Viewport};

const CLEAR_COLOR: Rgba = [0, 0, 0, 255];

/// Owns the window surface and presents one scene frame per redraw.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        let viewport = Viewport { width, height };
        if !viewport.is_drawable() {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = viewport;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_scene(&mut self, scene: &mut SceneRuntime) -> Result<(), Error> {
        if !self.viewport.is_drawable() {
            return Ok(());
        }

        let Viewport { width, height } = self.viewport;
        let mut canvas = FrameCanvas::new(self.pixels.frame_mut(), width, height);
        canvas.clear(CLEAR_COLOR);
        scene.render(&mut canvas);
        self.pixels.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surfaces_are_skipped() {
        assert!(Viewport { width: 1200, height: 800 }.is_drawable());
        assert!(!Viewport { width: 0, height: 800 }.is_drawable());
        assert!(!Viewport { width: 1200, height: 0 }.is_drawable());
        assert!(!Viewport::default().is_drawable());
    }
}
