use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, Modifiers, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::{ActionStates, KeyCommands};
use super::metrics::MetricsAccumulator;
use super::scene::{ButtonState, SceneRuntime};
use super::{InputAction, InputSnapshot, KeyCommand, Renderer, Scene, SceneCommand, Vec2};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "BushAdvencher Map Editor".to_string(),
            window_width: 1200,
            window_height: 800,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` until it asks to quit or the window
/// closes. Updates run at a fixed rate; rendering happens once per redraw.
pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let mut runtime = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let initial_viewport = renderer.viewport();
    let mut input_collector =
        InputCollector::new(initial_viewport.width, initial_viewport.height);

    runtime.load();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    input_collector.set_modifiers(&modifiers);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        let command = runtime.update(&input_snapshot);
                        if command == SceneCommand::Quit {
                            info!(reason = "scene_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if let Err(error) = renderer.render_scene(&mut runtime) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    let next_title = runtime.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                    metrics_accumulator.record_frame(
                        raw_frame_dt,
                        step_plan.ticks_to_run,
                        step_plan.dropped_backlog > Duration::ZERO,
                    );

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            avg_frame_ms = snapshot.avg_frame_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            clamped_frames = snapshot.clamped_frames,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ModifierState {
    control: bool,
    shift: bool,
}

#[derive(Debug, Default)]
struct InputCollector {
    held_keys: HashSet<KeyCode>,
    modifiers: ModifierState,
    action_states: ActionStates,
    command_edges: KeyCommands,
    cursor_position_px: Option<Vec2>,
    left: ButtonState,
    right: ButtonState,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn set_modifiers(&mut self, modifiers: &Modifiers) {
        let state = modifiers.state();
        // Command on macOS plays the role of Ctrl for shortcuts.
        self.modifiers = ModifierState {
            control: state.control_key() || state.super_key(),
            shift: state.shift_key(),
        };
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let PhysicalKey::Code(code) = key_event.physical_key else {
            return;
        };
        self.handle_key(code, key_event.state == ElementState::Pressed);
    }

    fn handle_key(&mut self, code: KeyCode, is_pressed: bool) {
        if let Some(action) = action_for_key(code) {
            self.action_states.set(action, is_pressed);
        }

        if !is_pressed {
            self.held_keys.remove(&code);
            return;
        }
        // OS auto-repeat re-sends presses while held; only the first counts.
        if !self.held_keys.insert(code) {
            return;
        }
        if let Some(command) = command_for_key(code, self.modifiers) {
            self.command_edges.set(command, true);
        }
    }

    /// Focus loss swallows the matching key-up events, so forget held state.
    fn release_all(&mut self) {
        self.held_keys.clear();
        self.action_states = ActionStates::default();
        if self.left.down {
            self.left.released = true;
        }
        if self.right.down {
            self.right.released = true;
        }
        self.left.down = false;
        self.right.down = false;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.action_states,
            self.command_edges,
            self.cursor_position_px,
            self.left,
            self.right,
            self.window_width,
            self.window_height,
        );
        self.command_edges.clear();
        self.left.pressed = false;
        self.left.released = false;
        self.right.pressed = false;
        self.right.released = false;
        snapshot
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let button_state = match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
            _ => return,
        };
        match state {
            ElementState::Pressed => {
                if !button_state.down {
                    button_state.pressed = true;
                }
                button_state.down = true;
            }
            ElementState::Released => {
                if button_state.down {
                    button_state.released = true;
                }
                button_state.down = false;
            }
        }
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        _ => None,
    }
}

fn command_for_key(code: KeyCode, modifiers: ModifierState) -> Option<KeyCommand> {
    match (code, modifiers.control, modifiers.shift) {
        (KeyCode::Escape, _, _) => Some(KeyCommand::Escape),
        (KeyCode::KeyP, false, _) => Some(KeyCommand::TogglePlay),
        (KeyCode::KeyE, false, _) => Some(KeyCommand::ToggleDesign),
        (KeyCode::KeyS, true, _) => Some(KeyCommand::Save),
        (KeyCode::KeyO, true, _) => Some(KeyCommand::Load),
        (KeyCode::KeyZ, true, false) => Some(KeyCommand::Undo),
        (KeyCode::KeyZ, true, true) | (KeyCode::KeyY, true, _) => Some(KeyCommand::Redo),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: ModifierState = ModifierState {
        control: true,
        shift: false,
    };
    const CTRL_SHIFT: ModifierState = ModifierState {
        control: true,
        shift: true,
    };

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn key_command_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::KeyP, true);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.command_pressed(KeyCommand::TogglePlay));
        assert!(!second.command_pressed(KeyCommand::TogglePlay));
    }

    #[test]
    fn held_key_does_not_spam_command_edges() {
        let mut input = InputCollector::default();

        input.handle_key(KeyCode::KeyE, true);
        let first = input.snapshot_for_tick();

        input.handle_key(KeyCode::KeyE, true);
        let second = input.snapshot_for_tick();

        input.handle_key(KeyCode::KeyE, false);
        input.handle_key(KeyCode::KeyE, true);
        let third = input.snapshot_for_tick();

        assert!(first.command_pressed(KeyCommand::ToggleDesign));
        assert!(!second.command_pressed(KeyCommand::ToggleDesign));
        assert!(third.command_pressed(KeyCommand::ToggleDesign));
    }

    #[test]
    fn escape_arrives_as_a_command() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::Escape, true);
        let snapshot = input.snapshot_for_tick();

        assert!(snapshot.command_pressed(KeyCommand::Escape));
    }

    #[test]
    fn shortcuts_require_control() {
        assert_eq!(command_for_key(KeyCode::KeyS, CTRL), Some(KeyCommand::Save));
        assert_eq!(command_for_key(KeyCode::KeyO, CTRL), Some(KeyCommand::Load));
        assert_eq!(command_for_key(KeyCode::KeyZ, CTRL), Some(KeyCommand::Undo));
        assert_eq!(
            command_for_key(KeyCode::KeyZ, CTRL_SHIFT),
            Some(KeyCommand::Redo)
        );
        assert_eq!(command_for_key(KeyCode::KeyY, CTRL), Some(KeyCommand::Redo));
        assert_eq!(
            command_for_key(KeyCode::KeyS, ModifierState::default()),
            None
        );
        assert_eq!(command_for_key(KeyCode::KeyP, CTRL), None);
    }

    #[test]
    fn ctrl_s_saves_but_still_moves_down() {
        let mut input = InputCollector {
            modifiers: CTRL,
            ..InputCollector::default()
        };
        input.handle_key(KeyCode::KeyS, true);
        let snapshot = input.snapshot_for_tick();

        assert!(snapshot.command_pressed(KeyCommand::Save));
        assert!(snapshot.is_down(InputAction::MoveDown));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.handle_key(KeyCode::KeyW, true);
        input.handle_key(KeyCode::ArrowLeft, true);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.handle_key(KeyCode::KeyD, true);
        input.handle_key(KeyCode::KeyD, false);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn left_click_is_edge_triggered_and_level_persists() {
        let mut input = InputCollector::new(1200, 800);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.left_click_pressed());
        assert!(!second.left_click_pressed());
        assert!(second.left_button_down());
    }

    #[test]
    fn release_edge_is_reported_once() {
        let mut input = InputCollector::new(1200, 800);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        let _ = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Right, ElementState::Released);
        let released = input.snapshot_for_tick();
        let after = input.snapshot_for_tick();

        assert!(released.right_released());
        assert!(!released.right_button_down());
        assert!(!after.right_released());
    }

    #[test]
    fn click_within_one_tick_reports_both_edges() {
        let mut input = InputCollector::new(1200, 800);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        let snapshot = input.snapshot_for_tick();

        assert!(snapshot.left_click_pressed());
        assert!(snapshot.left_released());
        assert!(!snapshot.left_button_down());
    }

    #[test]
    fn focus_loss_releases_held_buttons_and_actions() {
        let mut input = InputCollector::new(1200, 800);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_key(KeyCode::ArrowUp, true);
        let _ = input.snapshot_for_tick();

        input.release_all();
        let snapshot = input.snapshot_for_tick();

        assert!(snapshot.left_released());
        assert!(!snapshot.left_button_down());
        assert!(!snapshot.is_down(InputAction::MoveUp));
    }

    #[test]
    fn snapshot_carries_cursor_and_window_size() {
        let mut input = InputCollector::new(1200, 800);
        input.set_cursor_position_px(100.0, 200.0);
        let snapshot = input.snapshot_for_tick();

        assert_eq!(snapshot.window_size(), (1200, 800));
        let cursor = snapshot.cursor_position_px().expect("cursor");
        assert!((cursor.x - 100.0).abs() < 0.0001);
        assert!((cursor.y - 200.0).abs() < 0.0001);

        input.clear_cursor_position();
        assert!(input.snapshot_for_tick().cursor_position_px().is_none());
    }
}
