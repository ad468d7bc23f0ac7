//! Raw-mode terminal setup and teardown for the TUI.

use std::io::{self, Stdout};
use std::panic;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Owns the alternate screen; leaving it (drop or error path) restores the
/// user's terminal.
pub struct TerminalGuard {
    terminal: AppTerminal,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();
        enable_raw_mode()?;
        if let Err(err) = io::stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore();
        let _ = self.terminal.show_cursor();
    }
}

fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn install_panic_hook() {
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        previous_hook(panic_info);
    }));
}

/// Result of feeding one key to a hidden line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEdit {
    Continue,
    Done,
    Cancelled,
}

/// Apply `key` to `line` without echoing anything.
pub fn edit_hidden(line: &mut String, key: KeyEvent) -> LineEdit {
    match key.code {
        KeyCode::Enter => LineEdit::Done,
        KeyCode::Esc => LineEdit::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => LineEdit::Cancelled,
        KeyCode::Backspace => {
            line.pop();
            LineEdit::Continue
        }
        KeyCode::Char(c) => {
            line.push(c);
            LineEdit::Continue
        }
        _ => LineEdit::Continue,
    }
}

/// Read a line from the terminal with echo off. `None` when cancelled.
pub fn read_hidden_line() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let line = read_hidden_keys();
    disable_raw_mode()?;
    line
}

fn read_hidden_keys() -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match edit_hidden(&mut line, key) {
            LineEdit::Continue => {}
            LineEdit::Done => return Ok(Some(line)),
            LineEdit::Cancelled => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(keys: &[KeyEvent]) -> (String, LineEdit) {
        let mut line = String::new();
        let mut last = LineEdit::Continue;
        for key in keys {
            last = edit_hidden(&mut line, *key);
            if last != LineEdit::Continue {
                break;
            }
        }
        (line, last)
    }

    fn char_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_hidden_line_editing() {
        let keys = [
            char_key('p'),
            char_key('w'),
            char_key('x'),
            KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            char_key('d'),
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
        ];
        assert_eq!(feed(&keys), ("pwd".to_string(), LineEdit::Done));
    }

    #[test]
    fn test_hidden_line_cancel() {
        let keys = [
            char_key('p'),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ];
        assert_eq!(feed(&keys).1, LineEdit::Cancelled);
    }
}
