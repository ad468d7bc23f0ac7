//! Key bindings per screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::quiz::Phase;

use super::app::{Command, ScreenKind};

pub fn command_for(screen: ScreenKind, key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let common = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
        KeyCode::Esc => Some(Command::Back),
        _ => None,
    };
    if common.is_some() {
        return common;
    }

    match screen {
        ScreenKind::Catalog => match key.code {
            KeyCode::Enter => Some(Command::Confirm),
            KeyCode::Char('c') => Some(Command::CycleCategory),
            KeyCode::Char('d') => Some(Command::CycleDifficulty),
            KeyCode::Char('s') => Some(Command::CycleSort),
            KeyCode::Char('g') => Some(Command::Reload),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        },
        ScreenKind::Quiz(Phase::InProgress) => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => Some(Command::NextQuestion),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                Some(Command::PreviousQuestion)
            }
            KeyCode::Char(c @ '1'..='9') => {
                c.to_digit(10).map(|d| Command::JumpTo(d as usize - 1))
            }
            KeyCode::Char('S') => Some(Command::Submit),
            _ => None,
        },
        ScreenKind::Quiz(Phase::Completed) | ScreenKind::Quiz(Phase::Errored) => match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Again),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        },
        ScreenKind::Quiz(_) => None,
        ScreenKind::SignedOut => match key.code {
            KeyCode::Enter => Some(Command::Confirm),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quiz_bindings() {
        let screen = ScreenKind::Quiz(Phase::InProgress);
        assert_eq!(command_for(screen, key(KeyCode::Char('3'))), Some(Command::JumpTo(2)));
        assert_eq!(command_for(screen, key(KeyCode::Char('S'))), Some(Command::Submit));
        assert_eq!(command_for(screen, key(KeyCode::Char('q'))), None);
        assert_eq!(command_for(screen, key(KeyCode::Right)), Some(Command::NextQuestion));
    }

    #[test]
    fn test_same_key_differs_by_screen() {
        assert_eq!(
            command_for(ScreenKind::Catalog, key(KeyCode::Char('c'))),
            Some(Command::CycleCategory)
        );
        assert_eq!(
            command_for(ScreenKind::Quiz(Phase::Completed), key(KeyCode::Char('r'))),
            Some(Command::Again)
        );
        assert_eq!(command_for(ScreenKind::Quiz(Phase::Submitting), key(KeyCode::Char('r'))), None);
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(ScreenKind::Quiz(Phase::InProgress), event), Some(Command::Quit));
    }
}
