use image::RgbaImage;

use super::font::{glyph_or_space, GLYPH_ADVANCE_PX, GLYPH_WIDTH, TEXT_SCALE};
use super::{DrawSurface, Rect, Rgba};

/// Software rasterizer over a tightly packed RGBA8 frame buffer.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    clip: Rect,
}

impl<'a> FrameCanvas<'a> {
    /// A frame shorter than `width * height * 4` is tolerated: writes past its
    /// end are dropped.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            clip: Self::full_rect(width, height),
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    fn full_rect(width: u32, height: u32) -> Rect {
        Rect::new(0, 0, width as i32, height as i32)
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.clip.contains((x, y)) || color[3] == 0 {
            return;
        }
        let Some(offset) = pixel_offset(self.width, x, y) else {
            return;
        };
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        if color[3] == u8::MAX {
            dst.copy_from_slice(&color);
            return;
        }
        let alpha = u32::from(color[3]);
        for channel in 0..3 {
            let src = u32::from(color[channel]);
            let old = u32::from(dst[channel]);
            dst[channel] = ((src * alpha + old * (255 - alpha) + 127) / 255) as u8;
        }
        dst[3] = u8::MAX;
    }

    fn fill_clipped(&mut self, rect: Rect, color: Rgba) {
        let area = rect.intersect(self.clip);
        if area.is_empty() {
            return;
        }
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.blend_pixel(x, y, color);
            }
        }
    }
}

fn pixel_offset(width: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    (y as usize)
        .checked_mul(width as usize)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
}

impl DrawSurface for FrameCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        let full = Self::full_rect(self.width, self.height);
        self.clip = match clip {
            Some(rect) => rect.intersect(full),
            None => full,
        };
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.fill_clipped(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, thickness: i32) {
        if rect.is_empty() || thickness <= 0 {
            return;
        }
        let t = thickness.min(rect.w).min(rect.h);
        self.fill_clipped(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.fill_clipped(Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        let side_height = rect.h - 2 * t;
        if side_height > 0 {
            self.fill_clipped(Rect::new(rect.x, rect.y + t, t, side_height), color);
            self.fill_clipped(Rect::new(rect.right() - t, rect.y + t, t, side_height), color);
        }
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgba, thickness: i32) {
        let thickness = thickness.max(1);
        let half = (thickness - 1) / 2;

        // Axis-aligned lines are the common case (grids) and stay pixel exact.
        if from.0 == to.0 || from.1 == to.1 {
            let left = from.0.min(to.0);
            let top = from.1.min(to.1);
            let (w, h) = if from.1 == to.1 {
                ((from.0 - to.0).abs() + 1, thickness)
            } else {
                (thickness, (from.1 - to.1).abs() + 1)
            };
            let (x, y) = if from.1 == to.1 {
                (left, top - half)
            } else {
                (left - half, top)
            };
            self.fill_clipped(Rect::new(x, y, w, h), color);
            return;
        }

        let (mut x, mut y) = from;
        let dx = (to.0 - from.0).abs();
        let dy = -(to.1 - from.1).abs();
        let step_x = if from.0 < to.0 { 1 } else { -1 };
        let step_y = if from.1 < to.1 { 1 } else { -1 };
        let mut error = dx + dy;
        loop {
            self.fill_clipped(Rect::new(x - half, y - half, thickness, thickness), color);
            if (x, y) == to {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        let mut pen_x = x;
        for ch in text.chars() {
            let glyph = glyph_or_space(ch);
            for (row_index, row_bits) in glyph.iter().enumerate() {
                let glyph_y = y + row_index as i32 * TEXT_SCALE;
                for col in 0..GLYPH_WIDTH {
                    if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let cell = Rect::new(pen_x + col * TEXT_SCALE, glyph_y, TEXT_SCALE, TEXT_SCALE);
                    self.fill_clipped(cell, color);
                }
            }
            pen_x += GLYPH_ADVANCE_PX;
        }
    }

    fn blit(&mut self, image: &RgbaImage, x: i32, y: i32) {
        let bounds = Rect::new(x, y, image.width() as i32, image.height() as i32);
        let area = bounds.intersect(self.clip);
        if area.is_empty() {
            return;
        }
        for py in area.y..area.bottom() {
            for px in area.x..area.right() {
                let pixel = image.get_pixel((px - x) as u32, (py - y) as u32);
                self.blend_pixel(px, py, pixel.0);
            }
        }
    }
}
