use engine::{
    rgb, screen_to_world_px, world_to_screen_px, Camera2D, DrawSurface, InputSnapshot, KeyCommand,
    Rect, Rgba, Scene, SceneCommand, LINE_HEIGHT_PX,
};
use tracing::{debug, info};

use super::config::EditorConfig;
use super::items::{definition_of, ItemKind};
use super::layout::{PanelHit, Region, ScreenLayout, ToolbarButton, ITEM_SWATCH_SIZE};
use super::map_file::{load_map, save_map};
use super::messages::MessageLog;
use super::pixel_canvas::PixelCanvasEditor;
use super::pixel_panel::{PixelPanelLayout, PixelPanelTarget};
use super::player::{Player, PLAYER_COLOR};
use super::sprite_cache::SpriteRenderCache;
use super::sprites::{PixelSprite, SpriteStore, SPRITE_SIZE};
use super::tile_grid::TileGrid;

/// How far edit-mode panning may scroll past each map edge.
const PAN_OVERSCROLL_PX: i32 = 200;

const SCREEN_BACKGROUND: Rgba = rgb(40, 40, 40);
const TOOLBAR_BACKGROUND: Rgba = rgb(60, 60, 60);
const PANEL_BACKGROUND: Rgba = rgb(50, 50, 50);
const VIEW_BACKGROUND: Rgba = rgb(30, 30, 30);
const GRID_LINE: Rgba = rgb(60, 60, 60);
const DIVIDER: Rgba = rgb(100, 100, 100);
const BUTTON_BORDER: Rgba = rgb(200, 200, 200);
const PROPERTY_TEXT: Rgba = rgb(180, 180, 180);
const WHITE: Rgba = rgb(255, 255, 255);
const YELLOW: Rgba = rgb(255, 255, 0);

const PLAY_BUTTON: Rgba = rgb(100, 200, 100);
const STOP_BUTTON: Rgba = rgb(200, 100, 100);
const SAVE_BUTTON: Rgba = rgb(100, 100, 200);
const LOAD_BUTTON: Rgba = rgb(100, 200, 200);
const DESIGN_BUTTON: Rgba = rgb(200, 160, 80);
const DROP_IDLE: Rgba = rgb(80, 80, 80);
const DROP_ARMED: Rgba = rgb(150, 80, 80);

const PREVIEW_ALPHA: u8 = 128;
const FLOATING_SWATCH_SIZE: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditDrag {
    Idle,
    Painting,
    Erasing,
    Panning {
        start_camera: (i32, i32),
        start_mouse: (i32, i32),
    },
}

#[derive(Debug)]
enum EditorMode {
    Edit { drag: EditDrag },
    Play { player: Player },
    PixelDesign { kind: ItemKind },
}

impl EditorMode {
    fn editing() -> Self {
        EditorMode::Edit {
            drag: EditDrag::Idle,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            EditorMode::Edit { .. } => "EDIT",
            EditorMode::Play { .. } => "PLAY",
            EditorMode::PixelDesign { .. } => "DESIGN",
        }
    }
}

/// Owns all editor state and dispatches input per mode.
pub(crate) struct EditorShell {
    config: EditorConfig,
    grid: TileGrid,
    sprites: SpriteStore,
    sprite_cache: SpriteRenderCache,
    canvas: PixelCanvasEditor,
    camera: Camera2D,
    selected: Option<ItemKind>,
    mode: EditorMode,
    messages: MessageLog,
    layout: ScreenLayout,
    cursor: Option<(i32, i32)>,
}

impl EditorShell {
    pub(crate) fn new(config: EditorConfig) -> Self {
        let (width, height) = config.window_size;
        Self {
            grid: TileGrid::new(config.map_width, config.map_height, config.tile_size),
            sprites: SpriteStore::new(config.sprite_path.clone()),
            sprite_cache: SpriteRenderCache::new(),
            canvas: PixelCanvasEditor::new(),
            camera: Camera2D::default(),
            selected: None,
            mode: EditorMode::editing(),
            messages: MessageLog::new(),
            layout: ScreenLayout::new(width, height),
            cursor: None,
            config,
        }
    }

    fn is_edit_mode(&self) -> bool {
        matches!(self.mode, EditorMode::Edit { .. })
    }

    fn set_mode(&mut self, mode: EditorMode) {
        info!(from = self.mode.label(), to = mode.label(), "mode_changed");
        self.mode = mode;
    }

    fn set_drag(&mut self, next: EditDrag) {
        if let EditorMode::Edit { drag } = &mut self.mode {
            *drag = next;
        }
    }

    /// Returns `true` when the editor should quit.
    fn handle_escape(&mut self) -> bool {
        match self.mode {
            EditorMode::Edit { .. } => true,
            EditorMode::Play { .. } => {
                self.stop_play();
                false
            }
            EditorMode::PixelDesign { .. } => {
                self.finish_design();
                false
            }
        }
    }

    fn handle_commands(&mut self, input: &InputSnapshot) {
        if input.command_pressed(KeyCommand::TogglePlay) {
            self.toggle_play();
        }
        if input.command_pressed(KeyCommand::ToggleDesign) {
            self.toggle_design();
        }
        if input.command_pressed(KeyCommand::Save) {
            self.save_all();
        }
        if input.command_pressed(KeyCommand::Load) {
            self.load_all();
        }
        if input.command_pressed(KeyCommand::Undo) {
            self.step_design_history(false);
        }
        if input.command_pressed(KeyCommand::Redo) {
            self.step_design_history(true);
        }
    }

    fn handle_mouse(&mut self, input: &InputSnapshot) {
        if let Some(point) = self.cursor {
            if input.left_click_pressed() {
                self.on_left_press(point);
            } else if input.left_button_down() {
                self.on_left_drag(point);
            }
            if input.right_click_pressed() {
                self.on_right_press(point);
            } else if input.right_button_down() {
                self.on_right_drag(point);
            }
        }
        if input.left_released() {
            self.on_left_release();
        }
        if input.right_released() {
            self.on_right_release();
        }
    }

    fn on_left_press(&mut self, point: (i32, i32)) {
        match self.layout.region_at(point) {
            Some(Region::Toolbar) => {
                if let Some(button) = self.layout.toolbar_button_at(point) {
                    self.press_toolbar(button);
                }
            }
            Some(Region::ItemPanel) => {
                if !self.is_edit_mode() {
                    return;
                }
                match self.layout.panel_hit(point) {
                    Some(PanelHit::DropButton) => self.drop_selection(),
                    Some(PanelHit::Item(kind)) => self.select_item(kind),
                    None => {}
                }
            }
            Some(Region::View) => self.press_view(point),
            None => {}
        }
    }

    fn press_toolbar(&mut self, button: ToolbarButton) {
        match button {
            ToolbarButton::Play => self.toggle_play(),
            ToolbarButton::Save => self.save_all(),
            ToolbarButton::Load => self.load_all(),
            ToolbarButton::Design => self.toggle_design(),
        }
    }

    fn press_view(&mut self, point: (i32, i32)) {
        match self.mode {
            EditorMode::Edit { .. } => {
                if self.selected.is_some() {
                    self.set_drag(EditDrag::Painting);
                    self.place_at(point, self.selected);
                } else {
                    self.set_drag(EditDrag::Panning {
                        start_camera: (self.camera.x, self.camera.y),
                        start_mouse: point,
                    });
                }
            }
            EditorMode::Play { .. } => {}
            EditorMode::PixelDesign { .. } => self.press_pixel_panel(point),
        }
    }

    fn press_pixel_panel(&mut self, point: (i32, i32)) {
        match PixelPanelLayout::new(self.layout.view).hit(point) {
            Some(PixelPanelTarget::Canvas(x, y)) => {
                self.canvas.begin_stroke();
                self.canvas.paint(x, y);
            }
            Some(PixelPanelTarget::Palette(index)) => {
                self.canvas.select_color(index);
            }
            Some(PixelPanelTarget::Eraser) => self.canvas.select_eraser(),
            Some(PixelPanelTarget::Reset) => {
                if self.canvas.reset_to_default() {
                    self.commit_design();
                }
            }
            None => {}
        }
    }

    fn on_left_drag(&mut self, point: (i32, i32)) {
        match self.mode {
            EditorMode::Edit {
                drag: EditDrag::Painting,
            } => {
                if self.layout.view.contains(point) {
                    self.place_at(point, self.selected);
                }
            }
            EditorMode::Edit {
                drag:
                    EditDrag::Panning {
                        start_camera,
                        start_mouse,
                    },
            } => self.pan_view(start_camera, start_mouse, point),
            EditorMode::PixelDesign { .. } if self.canvas.stroke_active() => {
                let (x, y) = PixelPanelLayout::new(self.layout.view).cell_at(point);
                self.canvas.paint(x, y);
            }
            _ => {}
        }
    }

    fn on_left_release(&mut self) {
        match self.mode {
            EditorMode::Edit {
                drag: EditDrag::Painting | EditDrag::Panning { .. },
            } => self.set_drag(EditDrag::Idle),
            EditorMode::PixelDesign { .. } => {
                if self.canvas.end_stroke() {
                    self.commit_design();
                }
            }
            _ => {}
        }
    }

    fn on_right_press(&mut self, point: (i32, i32)) {
        if !self.is_edit_mode() {
            return;
        }
        match self.layout.region_at(point) {
            Some(Region::ItemPanel) => self.drop_selection(),
            Some(Region::View) => {
                self.set_drag(EditDrag::Erasing);
                self.place_at(point, None);
            }
            _ => {}
        }
    }

    fn on_right_drag(&mut self, point: (i32, i32)) {
        let erasing = matches!(
            self.mode,
            EditorMode::Edit {
                drag: EditDrag::Erasing
            }
        );
        if erasing && self.layout.view.contains(point) {
            self.place_at(point, None);
        }
    }

    fn on_right_release(&mut self) {
        if matches!(
            self.mode,
            EditorMode::Edit {
                drag: EditDrag::Erasing
            }
        ) {
            self.set_drag(EditDrag::Idle);
        }
    }

    /// Writes `kind` (or clears, for `None`) at the tile under a view point.
    fn place_at(&mut self, point: (i32, i32), kind: Option<ItemKind>) {
        let world = screen_to_world_px(point, &self.camera, self.layout.view);
        let Some((x, y)) = self.grid.tile_at_pixel(world) else {
            return;
        };
        if self.grid.set(x, y, kind) {
            debug!(x, y, item = ?kind, "tile_changed");
        }
    }

    fn pan_view(&mut self, start_camera: (i32, i32), start_mouse: (i32, i32), point: (i32, i32)) {
        let view = self.layout.view;
        let max = (
            self.grid.pixel_width() - view.w + PAN_OVERSCROLL_PX,
            self.grid.pixel_height() - view.h + PAN_OVERSCROLL_PX,
        );
        self.camera.pan_clamped(
            start_camera.0 - (point.0 - start_mouse.0),
            start_camera.1 - (point.1 - start_mouse.1),
            (-PAN_OVERSCROLL_PX, -PAN_OVERSCROLL_PX),
            max,
        );
    }

    fn select_item(&mut self, kind: ItemKind) {
        self.selected = Some(kind);
        self.messages
            .info(format!("Selected item: {}", definition_of(kind).name));
    }

    fn drop_selection(&mut self) {
        if self.selected.take().is_some() {
            self.messages.info("Item dropped");
        }
    }

    fn toggle_play(&mut self) {
        match self.mode {
            EditorMode::Edit { .. } => self.start_play(),
            EditorMode::Play { .. } => self.stop_play(),
            EditorMode::PixelDesign { .. } => {
                self.messages.warn("Finish the sprite design before playing")
            }
        }
    }

    fn start_play(&mut self) {
        let Some((x, y)) = self.grid.player_start() else {
            self.messages.warn("Player start position not set!");
            return;
        };
        let player = Player::spawn(x, y, self.grid.tile_size());
        self.set_mode(EditorMode::Play { player });
    }

    fn stop_play(&mut self) {
        self.set_mode(EditorMode::editing());
        self.camera.reset();
    }

    fn toggle_design(&mut self) {
        match self.mode {
            EditorMode::Edit { .. } => self.start_design(),
            EditorMode::PixelDesign { .. } => self.finish_design(),
            EditorMode::Play { .. } => self.messages.warn("Stop play mode before designing"),
        }
    }

    /// Opens the designer on the selected kind's sprite, or on a sprite
    /// filled with the kind's color when it has none yet.
    fn start_design(&mut self) {
        let Some(kind) = self.selected else {
            self.messages.warn("Select an item to design its sprite");
            return;
        };
        let definition = definition_of(kind);
        let sprite = self.sprites.get(kind).cloned().unwrap_or_else(|| {
            PixelSprite::filled(SPRITE_SIZE, SPRITE_SIZE, definition.color)
        });
        self.canvas.begin_editing(sprite, Some(definition.color));
        self.set_mode(EditorMode::PixelDesign { kind });
        self.messages
            .info(format!("Designing sprite: {}", definition.name));
    }

    /// Closes the designer and writes the sprite file. A stroke still held
    /// down is cut short; its pixels are kept.
    fn finish_design(&mut self) {
        let EditorMode::PixelDesign { kind } = self.mode else {
            return;
        };
        let interrupted = self.canvas.stroke_active();
        if let Some(sprite) = self.canvas.finish_editing() {
            if interrupted {
                self.sprites.set(kind, sprite);
            }
        }
        self.set_mode(EditorMode::editing());
        match self.sprites.save() {
            Ok(()) => self.messages.info("Sprites saved"),
            Err(err) => self.messages.warn(format!("Failed to save sprites: {err}")),
        }
    }

    /// Publishes the designer's current sprite to the store.
    fn commit_design(&mut self) {
        let EditorMode::PixelDesign { kind } = self.mode else {
            return;
        };
        if let Some(sprite) = self.canvas.sprite() {
            self.sprites.set(kind, sprite.clone());
        }
    }

    fn step_design_history(&mut self, redo: bool) {
        if !matches!(self.mode, EditorMode::PixelDesign { .. }) {
            return;
        }
        let changed = if redo {
            self.canvas.redo()
        } else {
            self.canvas.undo()
        };
        if changed {
            self.commit_design();
        }
    }

    fn save_all(&mut self) {
        let label = self.config.map_file_label();
        match save_map(&self.config.map_path, &self.grid) {
            Ok(()) => self.messages.info(format!("Map saved: {label}")),
            Err(err) => self.messages.warn(format!("Failed to save map: {err}")),
        }
        if let Err(err) = self.sprites.save() {
            self.messages.warn(format!("Failed to save sprites: {err}"));
        }
    }

    fn load_all(&mut self) {
        if !self.is_edit_mode() {
            self.messages.warn("Switch to edit mode to load");
            return;
        }
        let label = self.config.map_file_label();
        match load_map(&self.config.map_path) {
            Ok(Some(grid)) => {
                self.grid = grid;
                self.messages.info(format!("Map loaded: {label}"));
            }
            Ok(None) => self.messages.info("No saved map file found."),
            Err(err) => self.messages.warn(format!("Failed to load map: {err}")),
        }
        if let Err(err) = self.sprites.load() {
            self.messages.warn(format!("Failed to load sprites: {err}"));
        }
    }

    fn render_toolbar(&self, surface: &mut dyn DrawSurface) {
        surface.fill_rect(self.layout.toolbar, TOOLBAR_BACKGROUND);
        for button in ToolbarButton::ALL {
            let (label, color) = match (button, &self.mode) {
                (ToolbarButton::Play, EditorMode::Play { .. }) => ("Stop", STOP_BUTTON),
                (ToolbarButton::Play, _) => ("Play", PLAY_BUTTON),
                (ToolbarButton::Save, _) => ("Save", SAVE_BUTTON),
                (ToolbarButton::Load, _) => ("Load", LOAD_BUTTON),
                (ToolbarButton::Design, EditorMode::PixelDesign { .. }) => ("Done", DESIGN_BUTTON),
                (ToolbarButton::Design, _) => ("Design", DESIGN_BUTTON),
            };
            surface.fill_rect(button.rect(), color);
            draw_centered_text(surface, button.rect(), label, WHITE);
        }

        let right = self.layout.screen.right();
        if let EditorMode::Play { player } = &self.mode {
            let (x, y) = player.tile();
            surface.draw_text(right - 400, 15, &format!("Player: ({x}, {y})"), YELLOW);
        }
        surface.draw_text(
            right - 200,
            15,
            &format!("Mode: {}", self.mode.label()),
            WHITE,
        );
    }

    fn render_item_panel(&mut self, surface: &mut dyn DrawSurface) {
        let layout = self.layout;
        surface.fill_rect(layout.item_panel, PANEL_BACKGROUND);

        let drop = layout.drop_button();
        let (fill, label) = if self.selected.is_some() {
            (DROP_ARMED, "Drop Item")
        } else {
            (DROP_IDLE, "Default Mode")
        };
        surface.fill_rect(drop, fill);
        surface.stroke_rect(drop, BUTTON_BORDER, 2);
        draw_centered_text(surface, drop, label, WHITE);

        for (index, kind) in ItemKind::ALL.into_iter().enumerate() {
            let definition = definition_of(kind);
            let swatch = layout.item_swatch(index);
            match self
                .sprite_cache
                .get_or_render(&self.sprites, kind, swatch.w as u32)
            {
                Some(image) => surface.blit(image, swatch.x, swatch.y),
                None => surface.fill_rect(swatch, color_of(kind)),
            }
            if self.selected == Some(kind) {
                surface.stroke_rect(swatch, YELLOW, 3);
            } else {
                surface.stroke_rect(swatch, WHITE, 2);
            }

            let text_x = swatch.x + ITEM_SWATCH_SIZE + 5;
            surface.draw_text(text_x, swatch.y + 5, definition.name, WHITE);
            let mut properties = String::from(if definition.walkable {
                "Walkable"
            } else {
                "Blocking"
            });
            if definition.unique {
                properties.push_str(", Unique");
            }
            surface.draw_text(text_x, swatch.y + 22, &properties, PROPERTY_TEXT);
        }

        let edge = layout.item_panel.right();
        surface.draw_line(
            (edge, layout.item_panel.y),
            (edge, layout.item_panel.bottom()),
            DIVIDER,
            2,
        );
    }

    fn render_map_view(&mut self, surface: &mut dyn DrawSurface) {
        let view = self.layout.view;
        let tile = self.grid.tile_size();
        surface.fill_rect(view, VIEW_BACKGROUND);
        surface.set_clip(Some(view));

        let first = (
            self.camera.x.div_euclid(tile).max(0),
            self.camera.y.div_euclid(tile).max(0),
        );
        let last = (
            ((self.camera.x + view.w).div_euclid(tile) + 1).min(self.grid.width()),
            ((self.camera.y + view.h).div_euclid(tile) + 1).min(self.grid.height()),
        );

        if first.0 < last.0 && first.1 < last.1 {
            let top_left = world_to_screen_px((first.0 * tile, first.1 * tile), &self.camera, view);
            let bottom_right =
                world_to_screen_px((last.0 * tile, last.1 * tile), &self.camera, view);
            for x in first.0..=last.0 {
                let (sx, _) = world_to_screen_px((x * tile, 0), &self.camera, view);
                surface.draw_line((sx, top_left.1), (sx, bottom_right.1), GRID_LINE, 1);
            }
            for y in first.1..=last.1 {
                let (_, sy) = world_to_screen_px((0, y * tile), &self.camera, view);
                surface.draw_line((top_left.0, sy), (bottom_right.0, sy), GRID_LINE, 1);
            }
        }

        let playing = matches!(self.mode, EditorMode::Play { .. });
        for y in first.1..last.1 {
            for x in first.0..last.0 {
                let Some(cell) = self.grid.get(x, y) else {
                    continue;
                };
                if playing && cell.kind == ItemKind::PlayerStart {
                    continue;
                }
                let (sx, sy) = world_to_screen_px((x * tile, y * tile), &self.camera, view);
                match self
                    .sprite_cache
                    .get_or_render(&self.sprites, cell.kind, tile as u32)
                {
                    Some(image) => surface.blit(image, sx, sy),
                    None => {
                        let rect = Rect::new(sx, sy, tile, tile);
                        surface.fill_rect(rect, color_of(cell.kind));
                        surface.stroke_rect(rect, WHITE, 1);
                    }
                }
            }
        }

        if let EditorMode::Play { player } = &self.mode {
            let (sx, sy) = world_to_screen_px(player.pixel_position(), &self.camera, view);
            let rect = Rect::new(sx, sy, tile, tile);
            let [r, g, b] = PLAYER_COLOR;
            surface.fill_rect(rect, rgb(r, g, b));
            surface.stroke_rect(rect, WHITE, 2);
        }

        surface.set_clip(None);
    }

    /// Snapped translucent tile over the view, a floating swatch elsewhere.
    fn render_cursor_preview(&self, surface: &mut dyn DrawSurface) {
        if !self.is_edit_mode() {
            return;
        }
        let (Some(kind), Some(point)) = (self.selected, self.cursor) else {
            return;
        };
        let [r, g, b, _] = color_of(kind);
        let view = self.layout.view;

        if view.contains(point) {
            let world = screen_to_world_px(point, &self.camera, view);
            let Some((x, y)) = self.grid.tile_at_pixel(world) else {
                return;
            };
            let tile = self.grid.tile_size();
            let (sx, sy) = world_to_screen_px((x * tile, y * tile), &self.camera, view);
            let rect = Rect::new(sx, sy, tile, tile);
            surface.set_clip(Some(view));
            surface.fill_rect(rect, [r, g, b, PREVIEW_ALPHA]);
            surface.stroke_rect(rect, YELLOW, 2);
            surface.set_clip(None);
        } else {
            let half = FLOATING_SWATCH_SIZE / 2;
            let rect = Rect::new(
                point.0 - half,
                point.1 - half,
                FLOATING_SWATCH_SIZE,
                FLOATING_SWATCH_SIZE,
            );
            surface.fill_rect(rect, rgb(r, g, b));
            surface.stroke_rect(rect, YELLOW, 2);
        }
    }
}

impl Scene for EditorShell {
    fn load(&mut self) {
        if let Err(err) = self.sprites.load() {
            self.messages
                .warn(format!("Failed to load sprites: {err}"));
        }
        info!(
            map_width = self.grid.width(),
            map_height = self.grid.height(),
            tile_size = self.grid.tile_size(),
            sprite_file = %self.sprites.path().display(),
            "editor_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            self.layout = ScreenLayout::new(width, height);
        }
        self.cursor = input.cursor_point();
        self.messages.tick();

        if input.command_pressed(KeyCommand::Escape) && self.handle_escape() {
            info!("quit_requested");
            return SceneCommand::Quit;
        }
        self.handle_commands(input);
        self.handle_mouse(input);

        if let EditorMode::Play { player } = &mut self.mode {
            player.update(input, &self.grid);
            self.camera.follow(
                player.center_px(),
                (self.grid.pixel_width(), self.grid.pixel_height()),
                (self.layout.view.w, self.layout.view.h),
            );
        }
        SceneCommand::None
    }

    fn render(&mut self, surface: &mut dyn DrawSurface) {
        let (width, height) = surface.size();
        if (width as i32, height as i32) != (self.layout.screen.w, self.layout.screen.h) {
            self.layout = ScreenLayout::new(width, height);
        }

        surface.fill_rect(self.layout.screen, SCREEN_BACKGROUND);
        self.render_toolbar(surface);
        self.render_item_panel(surface);
        match self.mode {
            EditorMode::PixelDesign { kind } => {
                PixelPanelLayout::new(self.layout.view).render(surface, &self.canvas, kind);
            }
            EditorMode::Edit { .. } | EditorMode::Play { .. } => self.render_map_view(surface),
        }
        self.render_cursor_preview(surface);
        self.messages.render(surface);
    }

    fn unload(&mut self) {
        info!(
            mode = self.mode.label(),
            tile_count = self.grid.occupied_count(),
            sprite_count = self.sprites.len(),
            "editor_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!("BushAdvencher Map Editor [{}]", self.mode.label()))
    }
}

fn color_of(kind: ItemKind) -> Rgba {
    let [r, g, b] = definition_of(kind).color;
    rgb(r, g, b)
}

fn draw_centered_text(surface: &mut dyn DrawSurface, rect: Rect, text: &str, color: Rgba) {
    let x = rect.x + (rect.w - surface.measure_text(text)) / 2;
    let y = rect.y + (rect.h - LINE_HEIGHT_PX) / 2;
    surface.draw_text(x, y, text, color);
}
