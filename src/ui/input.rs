//! Keyboard input decoding.

use std::io::{self, Read};

/// What the driver should do in response to a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Ignored key.
    None,
    /// Switch the chart to received bytes (`r`).
    ShowReceived,
    /// Switch the chart to transmitted bytes (`t`).
    ShowTransmitted,
    /// Repaint the current frame (return).
    Redraw,
}

/// Maps one input byte to an action.
pub fn handle_key(byte: u8) -> KeyAction {
    match byte {
        b'r' => KeyAction::ShowReceived,
        b't' => KeyAction::ShowTransmitted,
        b'\n' | b'\r' => KeyAction::Redraw,
        _ => KeyAction::None,
    }
}

/// Drains whatever input is currently available and decodes it.
///
/// Intended for a non-blocking reader: `WouldBlock` and `Interrupted` end the
/// drain as "no more input", as does end of file.
pub fn read_keys<R: Read>(input: &mut R) -> io::Result<Vec<KeyAction>> {
    let mut actions = Vec::new();
    let mut buf = [0u8; 64];

    loop {
        match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => actions.extend(
                buf[..n]
                    .iter()
                    .map(|&b| handle_key(b))
                    .filter(|a| *a != KeyAction::None),
            ),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(actions)
}
