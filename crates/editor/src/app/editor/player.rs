use engine::{InputAction, InputSnapshot};

use super::tile_grid::TileGrid;

/// Pixels advanced per tick while moving. Speed is tied to the fixed tick
/// rate, not to wall-clock time.
pub(crate) const PLAYER_SPEED_PX: f32 = 8.0;
/// Idle ticks before a held direction is acted on.
pub(crate) const MOVE_DELAY_TICKS: u32 = 8;

pub(crate) const PLAYER_COLOR: [u8; 3] = [0, 0, 255];

/// Tile-stepping actor for play mode: idle on a tile, or sliding toward the
/// neighbouring target tile.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    tile_x: i32,
    tile_y: i32,
    target_x: i32,
    target_y: i32,
    pixel_x: f32,
    pixel_y: f32,
    moving: bool,
    move_timer: u32,
    tile_size: i32,
}

impl Player {
    pub(crate) fn spawn(tile_x: i32, tile_y: i32, tile_size: i32) -> Self {
        Self {
            tile_x,
            tile_y,
            target_x: tile_x,
            target_y: tile_y,
            pixel_x: (tile_x * tile_size) as f32,
            pixel_y: (tile_y * tile_size) as f32,
            moving: false,
            move_timer: 0,
            tile_size,
        }
    }

    pub(crate) fn tile(&self) -> (i32, i32) {
        (self.tile_x, self.tile_y)
    }

    #[cfg(test)]
    pub(crate) fn target(&self) -> (i32, i32) {
        (self.target_x, self.target_y)
    }

    #[cfg(test)]
    pub(crate) fn is_moving(&self) -> bool {
        self.moving
    }

    /// Interpolated top-left corner in world pixels.
    pub(crate) fn pixel_position(&self) -> (i32, i32) {
        (self.pixel_x as i32, self.pixel_y as i32)
    }

    pub(crate) fn center_px(&self) -> (i32, i32) {
        let (x, y) = self.pixel_position();
        (x + self.tile_size / 2, y + self.tile_size / 2)
    }

    /// One tick. Motion toward the target runs first, so the tick that lands
    /// on a tile can already count toward the next move.
    pub(crate) fn update(&mut self, input: &InputSnapshot, grid: &TileGrid) {
        if self.moving {
            self.advance();
        }

        if !self.moving {
            self.move_timer = self.move_timer.saturating_add(1);
            if self.move_timer >= MOVE_DELAY_TICKS {
                if let Some((dx, dy)) = held_direction(input) {
                    self.try_move(dx, dy, grid);
                }
            }
        }
    }

    /// Starts a step when the neighbour is walkable. Blocked moves leave the
    /// player and its repeat timer untouched.
    pub(crate) fn try_move(&mut self, dx: i32, dy: i32, grid: &TileGrid) -> bool {
        if self.moving {
            return false;
        }
        let next = (self.tile_x + dx, self.tile_y + dy);
        if !grid.is_walkable(next.0, next.1) {
            return false;
        }
        self.target_x = next.0;
        self.target_y = next.1;
        self.moving = true;
        self.move_timer = 0;
        true
    }

    fn advance(&mut self) {
        let target_px = (self.target_x * self.tile_size) as f32;
        let target_py = (self.target_y * self.tile_size) as f32;
        self.pixel_x = step_toward(self.pixel_x, target_px);
        self.pixel_y = step_toward(self.pixel_y, target_py);

        if self.pixel_x == target_px && self.pixel_y == target_py {
            self.tile_x = self.target_x;
            self.tile_y = self.target_y;
            self.moving = false;
        }
    }
}

fn step_toward(current: f32, target: f32) -> f32 {
    if current < target {
        (current + PLAYER_SPEED_PX).min(target)
    } else if current > target {
        (current - PLAYER_SPEED_PX).max(target)
    } else {
        current
    }
}

/// Horizontal wins over vertical; there is no diagonal movement.
fn held_direction(input: &InputSnapshot) -> Option<(i32, i32)> {
    [
        (InputAction::MoveLeft, (-1, 0)),
        (InputAction::MoveRight, (1, 0)),
        (InputAction::MoveUp, (0, -1)),
        (InputAction::MoveDown, (0, 1)),
    ]
    .into_iter()
    .find(|(action, _)| input.is_down(*action))
    .map(|(_, delta)| delta)
}
