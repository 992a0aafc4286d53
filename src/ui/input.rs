//! Keyboard mapping

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ecs::Heading;
use crate::game::PlayerCommand;

/// Input action that can be triggered by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    // Driving
    Turn(Heading),
    Fire,

    // Game flow
    Pause,
    Restart,

    // Display
    ToggleRenderMode,

    // System
    Quit,
}

impl InputAction {
    /// The game command behind this action, if it is not a display action
    pub fn command(self) -> Option<PlayerCommand> {
        match self {
            InputAction::Turn(heading) => Some(PlayerCommand::Turn(heading)),
            InputAction::Fire => Some(PlayerCommand::Fire),
            InputAction::Pause => Some(PlayerCommand::Pause),
            InputAction::Restart => Some(PlayerCommand::Restart),
            InputAction::Quit => Some(PlayerCommand::Quit),
            InputAction::ToggleRenderMode => None,
        }
    }
}

/// Map a key press to an action
pub fn map_key(key: KeyEvent) -> Option<InputAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(InputAction::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        // Arrow keys, WASD and vim-style
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => InputAction::Turn(Heading::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => InputAction::Turn(Heading::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => InputAction::Turn(Heading::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => InputAction::Turn(Heading::Right),

        KeyCode::Char(' ') | KeyCode::Char('f') => InputAction::Fire,
        KeyCode::Char('p') => InputAction::Pause,
        KeyCode::Char('r') => InputAction::Restart,
        KeyCode::Char('m') => InputAction::ToggleRenderMode,
        KeyCode::Char('q') | KeyCode::Esc => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}
