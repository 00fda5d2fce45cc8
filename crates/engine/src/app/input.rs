/// Continuous "is held" inputs, sampled every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
}

const ACTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
        }
    }
}

/// Discrete keyboard commands. Each is edge-triggered: reported for exactly one
/// tick per physical press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    Escape,
    TogglePlay,
    ToggleDesign,
    Save,
    Load,
    Undo,
    Redo,
}

const COMMAND_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyCommands {
    pressed: [bool; COMMAND_COUNT],
}

impl KeyCommands {
    pub(crate) fn set(&mut self, command: KeyCommand, pressed: bool) {
        self.pressed[command.index()] = pressed;
    }

    pub(crate) fn is_pressed(&self, command: KeyCommand) -> bool {
        self.pressed[command.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.pressed = [false; COMMAND_COUNT];
    }
}

impl KeyCommand {
    const fn index(self) -> usize {
        match self {
            KeyCommand::Escape => 0,
            KeyCommand::TogglePlay => 1,
            KeyCommand::ToggleDesign => 2,
            KeyCommand::Save => 3,
            KeyCommand::Load => 4,
            KeyCommand::Undo => 5,
            KeyCommand::Redo => 6,
        }
    }
}
