use engine::{rgb, DrawSurface, Rect, Rgba, LINE_HEIGHT_PX};

use super::items::{definition_of, ItemKind};
use super::pixel_canvas::{Brush, PixelCanvasEditor, PALETTE};
use super::sprites::SPRITE_SIZE;

const BACKGROUND: Rgba = rgb(40, 40, 40);
const CANVAS_BACKGROUND: Rgba = rgb(60, 60, 60);
const CANVAS_GRID: Rgba = rgb(80, 80, 80);
const SELECTED_BORDER: Rgba = rgb(255, 255, 0);
const IDLE_BORDER: Rgba = rgb(150, 150, 150);
const RESET_FILL: Rgba = rgb(150, 50, 50);
const RESET_BORDER: Rgba = rgb(200, 200, 200);
const HINT_COLOR: Rgba = rgb(200, 200, 200);
const WHITE: Rgba = rgb(255, 255, 255);

const CANVAS_TOP_OFFSET: i32 = 60;
const PALETTE_CELL: i32 = 30;
const PALETTE_STEP: i32 = 35;
const RESET_WIDTH: i32 = 120;
const RESET_HEIGHT: i32 = 30;
const SECTION_GAP: i32 = 15;

const HINTS: [&str; 2] = [
    "Left click/drag: Paint",
    "Ctrl+Z: Undo | Shift+Ctrl+Z: Redo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PixelPanelTarget {
    Canvas(i32, i32),
    Palette(usize),
    Eraser,
    Reset,
}

/// Geometry of the sprite designer drawn inside the map view rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelPanelLayout {
    panel: Rect,
    canvas: Rect,
    cell_size: i32,
}

impl PixelPanelLayout {
    pub(crate) fn new(panel: Rect) -> Self {
        let canvas_size = (panel.w - 40).min(panel.h - 200).max(SPRITE_SIZE as i32);
        let canvas = Rect::new(
            panel.x + (panel.w - canvas_size) / 2,
            panel.y + CANVAS_TOP_OFFSET,
            canvas_size,
            canvas_size,
        );
        Self {
            panel,
            canvas,
            cell_size: (canvas_size / SPRITE_SIZE as i32).max(1),
        }
    }

    #[cfg(test)]
    fn canvas(&self) -> Rect {
        self.canvas
    }

    #[cfg(test)]
    fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Sprite cell under a screen point. Points off the canvas map to cells
    /// outside the sprite, which painting ignores.
    pub(crate) fn cell_at(&self, point: (i32, i32)) -> (i32, i32) {
        (
            (point.0 - self.canvas.x).div_euclid(self.cell_size),
            (point.1 - self.canvas.y).div_euclid(self.cell_size),
        )
    }

    fn palette_top(&self) -> i32 {
        self.canvas.bottom() + 20
    }

    pub(crate) fn palette_cell(&self, index: usize) -> Rect {
        Rect::new(
            self.panel.x + 20 + index as i32 * PALETTE_STEP,
            self.palette_top(),
            PALETTE_CELL,
            PALETTE_CELL,
        )
    }

    /// The eraser sits right after the last color.
    pub(crate) fn eraser_cell(&self) -> Rect {
        self.palette_cell(PALETTE.len())
    }

    pub(crate) fn reset_button(&self) -> Rect {
        Rect::new(
            self.panel.x + (self.panel.w - RESET_WIDTH) / 2,
            self.palette_top() + PALETTE_CELL + SECTION_GAP,
            RESET_WIDTH,
            RESET_HEIGHT,
        )
    }

    pub(crate) fn hit(&self, point: (i32, i32)) -> Option<PixelPanelTarget> {
        if self.canvas.contains(point) {
            let (x, y) = self.cell_at(point);
            return Some(PixelPanelTarget::Canvas(x, y));
        }
        if let Some(index) = (0..PALETTE.len()).find(|&i| self.palette_cell(i).contains(point)) {
            return Some(PixelPanelTarget::Palette(index));
        }
        if self.eraser_cell().contains(point) {
            return Some(PixelPanelTarget::Eraser);
        }
        self.reset_button()
            .contains(point)
            .then_some(PixelPanelTarget::Reset)
    }

    pub(crate) fn render(
        &self,
        surface: &mut dyn DrawSurface,
        editor: &PixelCanvasEditor,
        kind: ItemKind,
    ) {
        surface.fill_rect(self.panel, BACKGROUND);
        let title = format!("Pixel Editor - {}", definition_of(kind).name);
        surface.draw_text(self.panel.x + 10, self.panel.y + 10, &title, WHITE);

        let Some(sprite) = editor.sprite() else {
            surface.draw_text(
                self.panel.x + 10,
                self.panel.y + 40,
                "No sprite selected",
                WHITE,
            );
            return;
        };

        surface.fill_rect(self.canvas, CANVAS_BACKGROUND);
        let cell = self.cell_size;
        for y in 0..sprite.height() {
            for x in 0..sprite.width() {
                if let Some([r, g, b]) = sprite.pixel(x, y) {
                    surface.fill_rect(
                        Rect::new(
                            self.canvas.x + x as i32 * cell,
                            self.canvas.y + y as i32 * cell,
                            cell,
                            cell,
                        ),
                        rgb(r, g, b),
                    );
                }
            }
        }

        let extent = SPRITE_SIZE as i32 * cell;
        for i in 0..=SPRITE_SIZE as i32 {
            let offset = i * cell;
            surface.draw_line(
                (self.canvas.x + offset, self.canvas.y),
                (self.canvas.x + offset, self.canvas.y + extent),
                CANVAS_GRID,
                1,
            );
            surface.draw_line(
                (self.canvas.x, self.canvas.y + offset),
                (self.canvas.x + extent, self.canvas.y + offset),
                CANVAS_GRID,
                1,
            );
        }

        self.render_palette(surface, editor.brush());
        self.render_reset(surface);

        let mut hint_y = self.reset_button().bottom() + SECTION_GAP;
        for hint in HINTS {
            surface.draw_text(self.panel.x + 20, hint_y, hint, HINT_COLOR);
            hint_y += LINE_HEIGHT_PX * 2;
        }
    }

    fn render_palette(&self, surface: &mut dyn DrawSurface, brush: Brush) {
        for (index, [r, g, b]) in PALETTE.into_iter().enumerate() {
            let cell = self.palette_cell(index);
            surface.fill_rect(cell, rgb(r, g, b));
            draw_selection_border(surface, cell, brush == Brush::Color(index));
        }

        let eraser = self.eraser_cell();
        surface.fill_rect(eraser, rgb(80, 80, 80));
        let inner = eraser.inset(5);
        surface.draw_line((inner.x, inner.y), (inner.right(), inner.bottom()), WHITE, 2);
        surface.draw_line((inner.right(), inner.y), (inner.x, inner.bottom()), WHITE, 2);
        draw_selection_border(surface, eraser, brush == Brush::Eraser);
    }

    fn render_reset(&self, surface: &mut dyn DrawSurface) {
        let button = self.reset_button();
        surface.fill_rect(button, RESET_FILL);
        surface.stroke_rect(button, RESET_BORDER, 2);
        let label = "Reset";
        let x = button.x + (button.w - surface.measure_text(label)) / 2;
        let y = button.y + (button.h - LINE_HEIGHT_PX) / 2;
        surface.draw_text(x, y, label, WHITE);
    }
}

fn draw_selection_border(surface: &mut dyn DrawSurface, cell: Rect, selected: bool) {
    if selected {
        surface.stroke_rect(cell, SELECTED_BORDER, 3);
    } else {
        surface.stroke_rect(cell, IDLE_BORDER, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PixelPanelLayout {
        PixelPanelLayout::new(Rect::new(200, 50, 1000, 750))
    }

    #[test]
    fn canvas_is_centered_and_sized_to_fit() {
        let layout = layout();
        assert_eq!(layout.canvas(), Rect::new(425, 110, 550, 550));
        assert_eq!(layout.cell_size(), 17);
    }

    #[test]
    fn canvas_points_map_to_cells() {
        let layout = layout();
        assert_eq!(layout.hit((425, 110)), Some(PixelPanelTarget::Canvas(0, 0)));
        assert_eq!(
            layout.hit((425 + 17 * 31 + 16, 110 + 17)),
            Some(PixelPanelTarget::Canvas(31, 1))
        );
        assert_eq!(layout.cell_at((420, 100)), (-1, -1));
    }

    #[test]
    fn palette_eraser_and_reset_hit_test() {
        let layout = layout();
        assert_eq!(layout.palette_cell(0), Rect::new(220, 680, 30, 30));
        assert_eq!(layout.hit((221, 681)), Some(PixelPanelTarget::Palette(0)));
        assert_eq!(layout.hit((220 + 35 * 14, 690)), Some(PixelPanelTarget::Palette(14)));
        assert_eq!(layout.hit((220 + 35 * 15 + 5, 690)), Some(PixelPanelTarget::Eraser));
        assert_eq!(layout.hit((252, 690)), None);
        assert_eq!(layout.reset_button(), Rect::new(640, 725, 120, 30));
        assert_eq!(layout.hit((700, 740)), Some(PixelPanelTarget::Reset));
    }

    #[test]
    fn small_panel_keeps_a_usable_cell_size() {
        let layout = PixelPanelLayout::new(Rect::new(0, 0, 60, 100));
        assert_eq!(layout.cell_size(), 1);
    }
}
