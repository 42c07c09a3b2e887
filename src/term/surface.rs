//! Write-only drawing surface over the terminal window.

use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use super::control::TerminalControl;
use super::window::{Dimensions, TerminalWindow};
use super::TerminalError;

/// Full-screen frame painter. Keeps the last frame so it can be repainted.
pub struct TerminalSurface<'a, C: TerminalControl, W: Write> {
    window: TerminalWindow<'a, C>,
    out: W,
    reserved_rows: u16,
    frame: Vec<String>,
}

impl<'a, C: TerminalControl, W: Write> TerminalSurface<'a, C, W> {
    /// `reserved_rows` are kept out of [`height`](Self::height) for
    /// non-chart lines.
    pub fn new(window: TerminalWindow<'a, C>, out: W, reserved_rows: u16) -> Self {
        Self {
            window,
            out,
            reserved_rows,
            frame: Vec::new(),
        }
    }

    /// Usable columns.
    pub fn width(&mut self) -> Result<usize, TerminalError> {
        Ok(self.window.dimensions()?.columns as usize)
    }

    /// Usable chart rows after the reserved lines.
    pub fn height(&mut self) -> Result<usize, TerminalError> {
        let rows = self.window.dimensions()?.rows;
        Ok(rows.saturating_sub(self.reserved_rows) as usize)
    }

    /// Replaces the frame and paints it from the top-left corner.
    pub fn draw(&mut self, lines: Vec<String>) -> Result<(), TerminalError> {
        self.frame = lines;
        self.paint()
    }

    /// Repaints the last frame, e.g. after the user pressed return.
    pub fn on_carriage_return(&mut self) -> Result<(), TerminalError> {
        self.paint()
    }

    pub fn frame(&self) -> &[String] {
        &self.frame
    }

    fn paint(&mut self) -> Result<(), TerminalError> {
        let Dimensions { columns, rows } = self.window.dimensions()?;
        for (row, line) in self.frame.iter().take(rows as usize).enumerate() {
            let visible: String = line.chars().take(columns as usize).collect();
            queue!(
                self.out,
                MoveTo(0, row as u16),
                Print(visible),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.out.flush()?;
        Ok(())
    }
}

impl<C: TerminalControl, W: Write> Drop for TerminalSurface<'_, C, W> {
    fn drop(&mut self) {
        // Leave the cursor below the chart so the shell prompt does not overwrite it
        let last_row = self.frame.len() as u16;
        let _ = queue!(self.out, MoveTo(0, last_row), Print("\n"));
        let _ = self.out.flush();
    }
}
