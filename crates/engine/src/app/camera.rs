/// Fraction of the viewport, per side, the follow target may roam before the
/// camera scrolls.
pub const DEAD_ZONE_FRACTION: f32 = 0.3;

/// World pixel shown at the top-left corner of the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera2D {
    pub x: i32,
    pub y: i32,
}

impl Camera2D {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Dead-zone follow: scrolls only once the target leaves the central
    /// margin, then clamps so the view never leaves `[0, world - view]`
    /// (pinned to 0 when the world is smaller than the view).
    pub fn follow(
        &mut self,
        target: (i32, i32),
        world_size: (i32, i32),
        view_size: (i32, i32),
    ) {
        self.x = follow_axis(self.x, target.0, world_size.0, view_size.0);
        self.y = follow_axis(self.y, target.1, world_size.1, view_size.1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Moves to `(x, y)` limited to `[min, max]` per axis. When the range is
    /// inverted the lower bound wins.
    pub fn pan_clamped(&mut self, x: i32, y: i32, min: (i32, i32), max: (i32, i32)) {
        self.x = x.min(max.0).max(min.0);
        self.y = y.min(max.1).max(min.1);
    }
}

fn follow_axis(camera: i32, target: i32, world_extent: i32, view_extent: i32) -> i32 {
    let margin = view_extent as f32 * DEAD_ZONE_FRACTION;
    let target = target as f32;
    let view = view_extent as f32;
    let mut position = camera as f32;

    if target < position + margin {
        position = target - margin;
    } else if target > position + view - margin {
        position = target - view + margin;
    }

    let max_position = (world_extent - view_extent).max(0) as f32;
    position.min(max_position).max(0.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: (i32, i32) = (1600, 1600);
    const VIEW: (i32, i32) = (200, 200);

    #[test]
    fn target_inside_dead_zone_does_not_scroll() {
        let mut camera = Camera2D::new(0, 0);
        camera.follow((100, 100), WORLD, VIEW);
        camera.follow((130, 130), WORLD, VIEW);
        assert_eq!(camera, Camera2D::new(0, 0));
    }

    #[test]
    fn leaving_left_margin_scrolls_then_clamps_to_world_origin() {
        let mut camera = Camera2D::new(0, 0);
        // 40 < 0 + 60 asks for x = -20, which the world minimum pins to 0.
        camera.follow((40, 100), WORLD, VIEW);
        assert_eq!(camera.x, 0);

        let mut scrolled = Camera2D::new(100, 0);
        scrolled.follow((140, 100), WORLD, VIEW);
        assert_eq!(scrolled.x, 80);
    }

    #[test]
    fn leaving_right_margin_scrolls_by_overshoot() {
        let mut camera = Camera2D::new(0, 0);
        camera.follow((150, 100), WORLD, VIEW);
        assert_eq!(camera.x, 10);
        assert_eq!(camera.y, 0);
    }

    #[test]
    fn camera_never_shows_past_world_end() {
        let mut camera = Camera2D::new(0, 0);
        camera.follow((1590, 1590), WORLD, VIEW);
        assert_eq!(camera, Camera2D::new(1400, 1400));
    }

    #[test]
    fn world_smaller_than_view_pins_to_origin() {
        let mut camera = Camera2D::new(0, 0);
        camera.follow((180, 180), (160, 160), VIEW);
        assert_eq!(camera, Camera2D::new(0, 0));
    }

    #[test]
    fn pan_clamped_respects_bounds_and_reset_returns_home() {
        let mut camera = Camera2D::default();
        camera.pan_clamped(-500, 900, (-200, -200), (800, 800));
        assert_eq!(camera, Camera2D::new(-200, 800));

        camera.pan_clamped(0, 0, (-200, -200), (-300, -300));
        assert_eq!(camera, Camera2D::new(-200, -200));

        camera.reset();
        assert_eq!(camera, Camera2D::default());
    }
}
