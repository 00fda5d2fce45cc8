use image::RgbaImage;

use super::font::text_width_px;
use super::Rect;

/// Straight (non-premultiplied) RGBA color.
pub type Rgba = [u8; 4];

/// Immediate-mode 2D drawing target handed to scenes once per frame.
///
/// Colors with alpha below 255 blend over what is already drawn. Every call is
/// limited to the current clip rectangle, or the whole surface when unset.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);
    fn set_clip(&mut self, clip: Option<Rect>);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Border drawn inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, thickness: i32);
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgba, thickness: i32);
    /// `(x, y)` is the top-left of the first glyph.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgba);
    fn blit(&mut self, image: &RgbaImage, x: i32, y: i32);

    fn measure_text(&self, text: &str) -> i32 {
        text_width_px(text)
    }
}

pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r, g, b, 255]
}

pub const fn with_alpha(color: Rgba, alpha: u8) -> Rgba {
    [color[0], color[1], color[2], alpha]
}
