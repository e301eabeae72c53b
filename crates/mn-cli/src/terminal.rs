//! Single-keystroke terminal input.
//!
//! Raw mode is held only while a key is being read, so anything printed
//! between reads goes through the normal line discipline.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use mn_core::{KeyRead, KeySource, KeySourceError};

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Reads keys from the controlling terminal without echo or line buffering.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub const fn new() -> Self {
        Self
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<KeyRead, KeySourceError> {
        let _raw = RawModeGuard::enable()?;
        loop {
            // Resize, focus and mouse events are not keystrokes.
            if let Event::Key(key) = event::read()? {
                if let Some(read) = translate(key) {
                    return Ok(read);
                }
            }
        }
    }
}

/// Maps a terminal key event to a key read.
///
/// Releases yield `None` so only one read is produced per keystroke.
/// Ctrl+letter becomes its control byte, as a tty would deliver it, so a
/// chord never passes for the plain category key.
fn translate(key: KeyEvent) -> Option<KeyRead> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyRead::Interrupted);
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return Some(KeyRead::Interrupted);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let byte = match key.code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => {
                char::from_u32(u32::from(c.to_ascii_uppercase()) - 0x40)
            }
            _ => None,
        };
        return Some(byte.map_or(KeyRead::Interrupted, KeyRead::Key));
    }
    let read = match key.code {
        KeyCode::Char(c) => KeyRead::Key(c),
        KeyCode::Enter => KeyRead::Key('\n'),
        KeyCode::Tab => KeyRead::Key('\t'),
        _ => KeyRead::Interrupted,
    };
    Some(read)
}
