//! Keyboard input for watch mode.
//!
//! Single keys map directly to watch loop commands. The terminal is put into
//! raw mode so keys arrive without waiting for Enter.

use std::io;
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::watch::Command;

/// Maps a key event to its watch loop command.
///
/// - `f`: Toggle hiding of failing results
/// - `h`: Toggle hiding of passing results
/// - `r`: Re-run all tests now
/// - `q` / `Esc` / `Ctrl+C`: Quit
///
/// Key releases and repeats are ignored.
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('f' | 'F') => Some(Command::ToggleHideFails),
        KeyCode::Char('h' | 'H') => Some(Command::ToggleHidePasses),
        KeyCode::Char('r' | 'R') => Some(Command::Rerun),
        _ => None,
    }
}

/// Enables raw mode for its lifetime.
pub struct RawModeGuard;

impl RawModeGuard {
    /// # Errors
    ///
    /// Returns an error when stdin is not a terminal.
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to restore terminal: {e}");
        }
    }
}

/// Reads keys on a dedicated thread and forwards mapped commands on `tx`.
///
/// The thread exits after forwarding `Quit`, when the receiver is gone, or
/// when reading from the terminal fails.
pub fn spawn_key_reader(tx: UnboundedSender<Command>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                warn!("Failed to read terminal input: {e}");
                // Treat a dead terminal as a quit request
                let _ = tx.send(Command::Quit);
                return;
            }
        };
        let Some(command) = map_key(key) else {
            continue;
        };
        debug!("Key {:?} -> {command:?}", key.code);
        if tx.send(command).is_err() || command == Command::Quit {
            return;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn f_toggles_hide_fails() {
        assert_eq!(map_key(press(KeyCode::Char('f'))), Some(Command::ToggleHideFails));
        assert_eq!(map_key(press(KeyCode::Char('F'))), Some(Command::ToggleHideFails));
    }

    #[test]
    fn h_toggles_hide_passes() {
        assert_eq!(map_key(press(KeyCode::Char('h'))), Some(Command::ToggleHidePasses));
    }

    #[test]
    fn r_reruns() {
        assert_eq!(map_key(press(KeyCode::Char('r'))), Some(Command::Rerun));
    }

    #[test]
    fn q_esc_and_ctrl_c_quit() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn plain_c_and_unmapped_keys_are_ignored() {
        assert_eq!(map_key(press(KeyCode::Char('c'))), None);
        assert_eq!(map_key(press(KeyCode::Char('x'))), None);
        assert_eq!(map_key(press(KeyCode::Enter)), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(release), None);
    }
}
