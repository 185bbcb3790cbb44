//! Key bindings — maps key events to dashboard actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::input::InputMode;
use crate::metrics::GoalPreset;

/// Dashboard actions triggered by key events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    ToggleHelp,
    /// Close overlays.
    Escape,
    /// Start typing an image path.
    BeginUpload,
    RemoveImage,
    /// Add current readings to the daily total.
    Commit,
    ResetProgress,
    ResetMax,
    ApplyPreset(GoalPreset),
    SelectPrev,
    SelectNext,
    /// Up/down: scrolls help when open, otherwise moves the selection.
    ScrollUp,
    ScrollDown,
    /// Start editing the selected metric's max.
    BeginEditMax,
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,
}

/// Map a key event given the current input mode.
pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match mode {
        InputMode::Normal => map_normal(key),
        InputMode::ImagePath => map_text_input(key, |_| true),
        // Limits are whole numbers: no sign, decimal point or exponent.
        InputMode::EditMax(_) => map_text_input(key, |c| c.is_ascii_digit()),
    }
}

fn map_normal(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::Escape),
        KeyCode::Char('u') => Some(Action::BeginUpload),
        KeyCode::Char('x') => Some(Action::RemoveImage),
        KeyCode::Char('a') => Some(Action::Commit),
        KeyCode::Char('r') => Some(Action::ResetProgress),
        KeyCode::Char('m') => Some(Action::ResetMax),
        KeyCode::Char('1') => Some(Action::ApplyPreset(GoalPreset::Fit)),
        KeyCode::Char('2') => Some(Action::ApplyPreset(GoalPreset::BodyBuilder)),
        KeyCode::Char('3') => Some(Action::ApplyPreset(GoalPreset::GainWeight)),
        KeyCode::Char('4') => Some(Action::ApplyPreset(GoalPreset::LoseWeight)),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::SelectPrev),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Char('e') | KeyCode::Enter => Some(Action::BeginEditMax),
        _ => None,
    }
}

fn map_text_input(key: KeyEvent, accept: impl Fn(char) -> bool) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::InputSubmit),
        KeyCode::Esc => Some(Action::InputCancel),
        KeyCode::Backspace => Some(Action::InputBackspace),
        KeyCode::Char(c) if accept(c) => Some(Action::InputChar(c)),
        _ => None,
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
    fn normal_mode_actions() {
        assert_eq!(map_key(key(KeyCode::Char('a')), InputMode::Normal), Some(Action::Commit));
        assert_eq!(
            map_key(key(KeyCode::Char('2')), InputMode::Normal),
            Some(Action::ApplyPreset(GoalPreset::BodyBuilder))
        );
        assert_eq!(map_key(key(KeyCode::Left), InputMode::Normal), Some(Action::SelectPrev));
        assert_eq!(map_key(key(KeyCode::Down), InputMode::Normal), Some(Action::ScrollDown));
        assert_eq!(map_key(key(KeyCode::Char('z')), InputMode::Normal), None);
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(ctrl_c, InputMode::Normal), Some(Action::Quit));
        assert_eq!(map_key(ctrl_c, InputMode::ImagePath), Some(Action::Quit));
        assert_eq!(map_key(ctrl_c, InputMode::EditMax(0)), Some(Action::Quit));
    }

    #[test]
    fn path_input_takes_any_char() {
        assert_eq!(
            map_key(key(KeyCode::Char('q')), InputMode::ImagePath),
            Some(Action::InputChar('q'))
        );
        assert_eq!(
            map_key(key(KeyCode::Enter), InputMode::ImagePath),
            Some(Action::InputSubmit)
        );
    }

    #[test]
    fn max_input_takes_digits_only() {
        let mode = InputMode::EditMax(2);
        assert_eq!(map_key(key(KeyCode::Char('7')), mode), Some(Action::InputChar('7')));
        assert_eq!(map_key(key(KeyCode::Char('-')), mode), None);
        assert_eq!(map_key(key(KeyCode::Char('.')), mode), None);
        assert_eq!(map_key(key(KeyCode::Char('e')), mode), None);
        assert_eq!(map_key(key(KeyCode::Esc), mode), Some(Action::InputCancel));
        assert_eq!(map_key(key(KeyCode::Backspace), mode), Some(Action::InputBackspace));
    }
}
