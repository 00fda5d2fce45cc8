use super::input::{ActionStates, InputAction, KeyCommand, KeyCommands};
use super::rendering::DrawSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Mouse button state for one tick: press/release edges plus the held level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ButtonState {
    pub(crate) pressed: bool,
    pub(crate) released: bool,
    pub(crate) down: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    commands: KeyCommands,
    cursor_position_px: Option<Vec2>,
    left: ButtonState,
    right: ButtonState,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        commands: KeyCommands,
        cursor_position_px: Option<Vec2>,
        left: ButtonState,
        right: ButtonState,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            actions,
            commands,
            cursor_position_px,
            left,
            right,
            window_width,
            window_height,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn command_pressed(&self, command: KeyCommand) -> bool {
        self.commands.is_pressed(command)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_command_pressed(mut self, command: KeyCommand) -> Self {
        self.commands.set(command, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    /// Press edge; also marks the button as held, as a real press would.
    pub fn with_left_click_pressed(mut self, pressed: bool) -> Self {
        self.left.pressed = pressed;
        self.left.down |= pressed;
        self
    }

    pub fn with_left_button_down(mut self, down: bool) -> Self {
        self.left.down = down;
        self
    }

    pub fn with_left_released(mut self, released: bool) -> Self {
        self.left.released = released;
        if released {
            self.left.down = false;
        }
        self
    }

    pub fn with_right_click_pressed(mut self, pressed: bool) -> Self {
        self.right.pressed = pressed;
        self.right.down |= pressed;
        self
    }

    pub fn with_right_button_down(mut self, down: bool) -> Self {
        self.right.down = down;
        self
    }

    pub fn with_right_released(mut self, released: bool) -> Self {
        self.right.released = released;
        if released {
            self.right.down = false;
        }
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    /// Cursor snapped to whole screen pixels.
    pub fn cursor_point(&self) -> Option<(i32, i32)> {
        self.cursor_position_px
            .map(|cursor| (cursor.x.floor() as i32, cursor.y.floor() as i32))
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left.pressed
    }

    pub fn left_button_down(&self) -> bool {
        self.left.down
    }

    pub fn left_released(&self) -> bool {
        self.left.released
    }

    pub fn right_click_pressed(&self) -> bool {
        self.right.pressed
    }

    pub fn right_button_down(&self) -> bool {
        self.right.down
    }

    pub fn right_released(&self) -> bool {
        self.right.released
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

/// One application screen driven by the frame loop.
///
/// `load` runs once before the first tick and `unload` once when the loop
/// exits; `update` runs at the fixed tick rate and `render` once per
/// presented frame.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, surface: &mut dyn DrawSurface);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(input)
    }

    pub(crate) fn render(&mut self, surface: &mut dyn DrawSurface) {
        if self.is_loaded {
            self.scene.render(surface);
        }
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload();
        self.is_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::rendering::Rect;
    use crate::app::{Rgba, RgbaImage};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CallLog {
        loads: u32,
        updates: u32,
        renders: u32,
        unloads: u32,
    }

    struct CountingScene {
        log: Rc<RefCell<CallLog>>,
    }

    impl Scene for CountingScene {
        fn load(&mut self) {
            self.log.borrow_mut().loads += 1;
        }

        fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
            self.log.borrow_mut().updates += 1;
            if input.command_pressed(KeyCommand::Escape) {
                SceneCommand::Quit
            } else {
                SceneCommand::None
            }
        }

        fn render(&mut self, _surface: &mut dyn DrawSurface) {
            self.log.borrow_mut().renders += 1;
        }

        fn unload(&mut self) {
            self.log.borrow_mut().unloads += 1;
        }
    }

    struct NullSurface;

    impl DrawSurface for NullSurface {
        fn size(&self) -> (u32, u32) {
            (0, 0)
        }
        fn set_clip(&mut self, _clip: Option<Rect>) {}
        fn fill_rect(&mut self, _rect: Rect, _color: Rgba) {}
        fn stroke_rect(&mut self, _rect: Rect, _color: Rgba, _thickness: i32) {}
        fn draw_line(&mut self, _from: (i32, i32), _to: (i32, i32), _color: Rgba, _thickness: i32) {}
        fn draw_text(&mut self, _x: i32, _y: i32, _text: &str, _color: Rgba) {}
        fn blit(&mut self, _image: &RgbaImage, _x: i32, _y: i32) {}
    }

    fn runtime() -> (SceneRuntime, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let scene = CountingScene {
            log: Rc::clone(&log),
        };
        (SceneRuntime::new(Box::new(scene)), log)
    }

    #[test]
    fn runtime_ignores_update_and_render_before_load() {
        let (mut runtime, log) = runtime();
        assert_eq!(
            runtime.update(&InputSnapshot::empty()),
            SceneCommand::None
        );
        runtime.render(&mut NullSurface);

        assert_eq!(log.borrow().updates, 0);
        assert_eq!(log.borrow().renders, 0);
    }

    #[test]
    fn load_and_shutdown_run_once() {
        let (mut runtime, log) = runtime();
        runtime.load();
        runtime.load();
        runtime.shutdown();
        runtime.shutdown();

        assert_eq!(log.borrow().loads, 1);
        assert_eq!(log.borrow().unloads, 1);
    }

    #[test]
    fn update_forwards_scene_command() {
        let (mut runtime, _log) = runtime();
        runtime.load();
        let input = InputSnapshot::empty().with_command_pressed(KeyCommand::Escape);
        assert_eq!(runtime.update(&input), SceneCommand::Quit);
    }

    #[test]
    fn press_builders_imply_held_and_release_clears_it() {
        let pressed = InputSnapshot::empty().with_left_click_pressed(true);
        assert!(pressed.left_click_pressed());
        assert!(pressed.left_button_down());

        let released = pressed.with_left_released(true);
        assert!(released.left_released());
        assert!(!released.left_button_down());
    }

    #[test]
    fn cursor_point_floors_subpixel_positions() {
        let input = InputSnapshot::empty().with_cursor_position_px(Some(Vec2 { x: 10.7, y: -0.5 }));
        assert_eq!(input.cursor_point(), Some((10, -1)));
    }
}
