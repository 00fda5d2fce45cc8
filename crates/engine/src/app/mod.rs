mod camera;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use camera::{Camera2D, DEAD_ZONE_FRACTION};
pub use image::RgbaImage;
pub use input::{InputAction, KeyCommand};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    rgb, screen_to_world_px, with_alpha, world_to_screen_px, DrawSurface, FrameCanvas, Rect,
    Renderer, Rgba, Viewport, GLYPH_ADVANCE_PX, LINE_HEIGHT_PX,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, Vec2};
