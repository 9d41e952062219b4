//! Keyboard input with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use puyors::{Action, Settings};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);
const DAS: Duration = Duration::from_millis(170);
const ARR: Duration = Duration::from_millis(50);

/// What the loop should do with a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Game(Action),
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("Unknown key name in settings: {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            hard_drop: Self::parse_keys(&keys.hard_drop),
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            pause: Self::parse_keys(&keys.pause),
            restart: Self::parse_keys(&keys.restart),
            quit: Self::parse_keys(&keys.quit),
        }
    }
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Input handler with DAS/ARR support
pub struct InputHandler {
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    /// Last time the soft drop key was seen
    soft_drop_seen: Option<Instant>,
    bindings: KeyBindings,
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            soft_drop_seen: None,
            bindings: KeyBindings::from_settings(settings),
        }
    }

    /// Handle a key press event - returns the immediate command, if any
    pub fn key_down(&mut self, key: KeyEvent) -> Option<Command> {
        let now = Instant::now();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        let code = normalize_key(key.code);
        let b = &self.bindings;

        if b.move_left.contains(&code) {
            self.right_state = None;
            return Self::press(&mut self.left_state, now).then_some(Command::Game(Action::MoveLeft));
        }
        if b.move_right.contains(&code) {
            self.left_state = None;
            return Self::press(&mut self.right_state, now).then_some(Command::Game(Action::MoveRight));
        }
        if b.soft_drop.contains(&code) {
            self.soft_drop_seen = Some(now);
            return None;
        }

        let action = if b.hard_drop.contains(&code) {
            Action::HardDrop
        } else if b.rotate_cw.contains(&code) {
            Action::RotateCw
        } else if b.rotate_ccw.contains(&code) {
            Action::RotateCcw
        } else if b.pause.contains(&code) {
            Action::Pause
        } else if b.restart.contains(&code) {
            Action::Restart
        } else if b.quit.contains(&code) {
            return Some(Command::Quit);
        } else {
            return None;
        };

        if matches!(action, Action::Pause | Action::Restart) {
            self.clear();
        }
        Some(Command::Game(action))
    }

    /// Record a press; true if it is a fresh press rather than a terminal repeat
    fn press(state: &mut Option<KeyPressState>, now: Instant) -> bool {
        match state {
            Some(held) => {
                held.last_seen = now;
                false
            }
            None => {
                *state = Some(KeyPressState::new(now));
                true
            }
        }
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.soft_drop_seen = None;
        }
    }

    /// Whether soft drop is currently held
    pub fn soft_drop_held(&self) -> bool {
        self.soft_drop_seen
            .is_some_and(|seen| seen.elapsed() <= KEY_TIMEOUT)
    }

    /// Update held keys and return repeat actions (call every frame)
    pub fn update(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let now = Instant::now();

        // Check for timed-out keys (no recent key event = released)
        for state in [&mut self.left_state, &mut self.right_state] {
            if state
                .as_ref()
                .is_some_and(|s| now.duration_since(s.last_seen) > KEY_TIMEOUT)
            {
                *state = None;
            }
        }

        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now) {
                actions.push(Action::MoveLeft);
            }
        }
        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now) {
                actions.push(Action::MoveRight);
            }
        }

        actions
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.soft_drop_seen = None;
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant) -> bool {
    if now.duration_since(state.first_press) < DAS {
        return false;
    }

    if !state.das_triggered {
        // First trigger after DAS
        state.das_triggered = true;
        state.last_arr = Some(now);
        return true;
    }
    if let Some(last) = state.last_arr {
        // Subsequent ARR triggers
        if now.duration_since(last) >= ARR {
            state.last_arr = Some(now);
            return true;
        }
    }
    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(KeyBindings::parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("esc"), Some(KeyCode::Esc));
        assert_eq!(KeyBindings::parse_key("X"), Some(KeyCode::Char('x')));
        assert_eq!(KeyBindings::parse_key("banana"), None);
    }

    #[test]
    fn test_default_bindings_map_to_actions() {
        let mut input = InputHandler::from_settings(&Settings::default());
        assert_eq!(input.key_down(key(KeyCode::Char(' '))), Some(Command::Game(Action::HardDrop)));
        assert_eq!(input.key_down(key(KeyCode::Char('Z'))), Some(Command::Game(Action::RotateCcw)));
        assert_eq!(input.key_down(key(KeyCode::Char('r'))), Some(Command::Game(Action::Restart)));
        assert_eq!(input.key_down(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(input.key_down(key(KeyCode::F(5))), None);
    }

    #[test]
    fn test_held_move_fires_once_until_released() {
        let mut input = InputHandler::from_settings(&Settings::default());
        assert_eq!(input.key_down(key(KeyCode::Left)), Some(Command::Game(Action::MoveLeft)));
        assert_eq!(input.key_down(key(KeyCode::Left)), None);
        input.key_up(key(KeyCode::Left));
        assert_eq!(input.key_down(key(KeyCode::Left)), Some(Command::Game(Action::MoveLeft)));
    }

    #[test]
    fn test_soft_drop_is_held_state() {
        let mut input = InputHandler::from_settings(&Settings::default());
        assert!(!input.soft_drop_held());
        assert_eq!(input.key_down(key(KeyCode::Down)), None);
        assert!(input.soft_drop_held());
        input.key_up(key(KeyCode::Down));
        assert!(!input.soft_drop_held());
    }
}
