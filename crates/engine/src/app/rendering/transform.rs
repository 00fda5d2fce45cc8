use crate::app::Camera2D;

use super::Rect;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// A minimized window reports a zero-sized surface.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Maps a world pixel into screen space for a camera drawing into `view`.
pub fn world_to_screen_px(world: (i32, i32), camera: &Camera2D, view: Rect) -> (i32, i32) {
    (view.x + world.0 - camera.x, view.y + world.1 - camera.y)
}

pub fn screen_to_world_px(screen: (i32, i32), camera: &Camera2D, view: Rect) -> (i32, i32) {
    (screen.0 - view.x + camera.x, screen.1 - view.y + camera.y)
}
