mod canvas;
mod font;
mod rect;
mod renderer;
mod surface;
mod transform;

pub use canvas::FrameCanvas;
pub use font::{GLYPH_ADVANCE_PX, LINE_HEIGHT_PX};
pub use rect::Rect;
pub use renderer::Renderer;
pub use surface::{rgb, with_alpha, DrawSurface, Rgba};
pub use transform::{screen_to_world_px, world_to_screen_px, Viewport};
